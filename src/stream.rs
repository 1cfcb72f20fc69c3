//! Cursor over a token sequence with one-token lookahead.

use crate::{
    ast::{Token, TokenKind},
    error::Error,
};

pub struct TokenStream<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> TokenStream<'a> {
    /// Wraps `tokens`, appending an `Eof` token if the sequence lacks one so
    /// the cursor always has a token to report.
    pub fn new(expression: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = expression.chars().count();
            tokens.push(Token::bare(TokenKind::Eof, end));
        }
        TokenStream {
            expression,
            tokens,
            position: 0,
        }
    }

    /// The current token. Past the end this stays on `Eof`.
    pub fn token(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub fn kind(&self) -> TokenKind {
        self.token().kind
    }

    /// The token `offset` positions ahead of the current one.
    pub fn lookahead(&self, offset: usize) -> &Token {
        &self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
    }

    /// Moves to the next token.
    pub fn advance(&mut self) -> &Token {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        self.token()
    }

    /// Moves to the next token, which must be one of `expected`.
    pub fn advance_matching(&mut self, expected: &[TokenKind]) -> Result<&Token, Error> {
        self.advance();
        let kind = self.kind();
        if !expected.contains(&kind) {
            let names: Vec<&str> = expected.iter().map(|k| k.name()).collect();
            return Err(self.error(format!(
                "expected one of [{}], got {}",
                names.join(", "),
                kind
            )));
        }
        Ok(self.token())
    }

    /// Builds a syntax error located at the current token.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Syntax {
            message: message.into(),
            expression: self.expression.to_string(),
            position: self.token().position,
        }
    }
}
