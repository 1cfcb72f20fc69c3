use crate::{
    ast::{Token, TokenKind},
    convert::json_to_value,
    value::Value,
};

/// Lexer state selected by the first character of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Identifier,
    Number,
    Whitespace,
    Single(TokenKind),
    LBracket,
    Pipe,
    Ampersand,
    Equals,
    Bang,
    LessThan,
    GreaterThan,
    Quoted(Quote),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    /// `'raw string'`
    Raw,
    /// `"quoted identifier"`
    Identifier,
    /// `` `json literal` ``
    Json,
}

impl Quote {
    fn delimiter(self) -> char {
        match self {
            Quote::Raw => '\'',
            Quote::Identifier => '"',
            Quote::Json => '`',
        }
    }
}

/// Static character -> state table.
const fn state_for(ch: char) -> State {
    match ch {
        'a'..='z' | 'A'..='Z' | '_' => State::Identifier,
        '0'..='9' | '-' => State::Number,
        ' ' | '\t' | '\n' | '\r' => State::Whitespace,
        '.' => State::Single(TokenKind::Dot),
        '*' => State::Single(TokenKind::Star),
        ']' => State::Single(TokenKind::RBracket),
        ',' => State::Single(TokenKind::Comma),
        ':' => State::Single(TokenKind::Colon),
        '@' => State::Single(TokenKind::Current),
        '(' => State::Single(TokenKind::LParen),
        ')' => State::Single(TokenKind::RParen),
        '{' => State::Single(TokenKind::LBrace),
        '}' => State::Single(TokenKind::RBrace),
        '[' => State::LBracket,
        '|' => State::Pipe,
        '&' => State::Ampersand,
        '=' => State::Equals,
        '!' => State::Bang,
        '<' => State::LessThan,
        '>' => State::GreaterThan,
        '\'' => State::Quoted(Quote::Raw),
        '"' => State::Quoted(Quote::Identifier),
        '`' => State::Quoted(Quote::Json),
        _ => State::Unknown,
    }
}

/// Converts expression text into tokens.
///
/// The lexer never fails: characters it cannot place become
/// [`TokenKind::Unknown`] tokens, and the parser reports them with their
/// position.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position.min(self.input.len())]
            .iter()
            .collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if state_for(ch) == State::Whitespace {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        if self.current_char() == Some('-') {
            self.advance();
        }
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let text = self.text_from(start);
        match text.parse::<i64>() {
            Ok(n) => Token::new(TokenKind::Number, Value::Integer(n), start),
            // A lone '-' or an integer that does not fit in i64
            Err(_) => Token::new(TokenKind::Unknown, Value::String(text), start),
        }
    }

    /// Matches `second` after the current character, producing `matched`,
    /// or falls back to the single-character token.
    fn read_pair(&mut self, second: char, matched: TokenKind, fallback: TokenKind) -> Token {
        let start = self.position;
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            Token::bare(matched, start)
        } else {
            Token::bare(fallback, start)
        }
    }

    /// Reads a comparator that may be followed by `=`. Without the `=`,
    /// `single` is the one-character comparator, or `None` when the lone
    /// character is not an operator on its own (`=`).
    fn read_comparator(&mut self, single: Option<&str>, doubled: &str) -> Token {
        let start = self.position;
        self.advance();
        if self.current_char() == Some('=') {
            self.advance();
            return Token::new(TokenKind::Comparator, Value::from(doubled), start);
        }
        match single {
            Some(symbol) => Token::new(TokenKind::Comparator, Value::from(symbol), start),
            None => Token::new(TokenKind::Unknown, Value::String(self.text_from(start)), start),
        }
    }

    fn read_lbracket(&mut self) -> Token {
        let start = self.position;
        self.advance();
        match self.current_char() {
            Some(']') => {
                self.advance();
                Token::bare(TokenKind::Flatten, start)
            }
            Some('?') => {
                self.advance();
                Token::bare(TokenKind::Filter, start)
            }
            _ => Token::bare(TokenKind::LBracket, start),
        }
    }

    /// Scans to the matching unescaped delimiter, keeping escape sequences
    /// in the returned text. Returns `None` when the input ends first.
    fn read_delimited(&mut self, delimiter: char) -> Option<String> {
        self.advance(); // Consume opening delimiter
        let mut result = String::new();

        while let Some(ch) = self.current_char() {
            if ch == delimiter {
                self.advance();
                return Some(result);
            }
            if ch == '\\' {
                result.push(ch);
                self.advance();
                match self.current_char() {
                    Some(escaped) => {
                        result.push(escaped);
                        self.advance();
                    }
                    None => return None,
                }
                continue;
            }
            result.push(ch);
            self.advance();
        }
        None
    }

    fn read_quoted(&mut self, quote: Quote) -> Token {
        let start = self.position;
        let Some(text) = self.read_delimited(quote.delimiter()) else {
            return Token::new(TokenKind::Unknown, Value::String(self.text_from(start)), start);
        };

        let decoded = match quote {
            Quote::Raw => Some((TokenKind::Literal, Value::String(text.replace("\\'", "'")))),
            Quote::Identifier => serde_json::from_str::<String>(&format!("\"{}\"", text))
                .ok()
                .map(|name| (TokenKind::QuotedIdentifier, Value::String(name))),
            Quote::Json => serde_json::from_str::<serde_json::Value>(&text.replace("\\`", "`"))
                .ok()
                .map(|json| (TokenKind::Literal, json_to_value(json))),
        };

        match decoded {
            Some((kind, value)) => Token::new(kind, value, start),
            None => {
                log::trace!("undecodable quoted text at position {}: {}", start, text);
                Token::new(TokenKind::Unknown, Value::String(self.text_from(start)), start)
            }
        }
    }

    /// Returns the next token, or `Eof` once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Token::bare(TokenKind::Eof, self.input.len());
        };
        let start = self.position;

        match state_for(ch) {
            State::Identifier => {
                let ident = self.read_identifier();
                Token::new(TokenKind::Identifier, Value::String(ident), start)
            }
            State::Number => self.read_number(),
            State::Single(kind) => {
                self.advance();
                Token::bare(kind, start)
            }
            State::LBracket => self.read_lbracket(),
            State::Pipe => self.read_pair('|', TokenKind::Or, TokenKind::Pipe),
            State::Ampersand => self.read_pair('&', TokenKind::And, TokenKind::Expref),
            State::Bang => {
                if self.peek_char(1) == Some('=') {
                    self.read_comparator(None, "!=")
                } else {
                    self.advance();
                    Token::bare(TokenKind::Not, start)
                }
            }
            State::Equals => self.read_comparator(None, "=="),
            State::LessThan => self.read_comparator(Some("<"), "<="),
            State::GreaterThan => self.read_comparator(Some(">"), ">="),
            State::Quoted(quote) => self.read_quoted(quote),
            State::Whitespace | State::Unknown => {
                self.advance();
                Token::new(TokenKind::Unknown, Value::String(ch.to_string()), start)
            }
        }
    }

    /// Consumes the lexer, producing every token up to and including `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

/// Tokenizes `input`; the result always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Vec<Token> {
    let tokens = Lexer::new(input).tokenize();
    log::trace!("tokenized `{}` into {} tokens", input, tokens.len());
    tokens
}

#[cfg(test)]
fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_multi_char_operators() {
    assert_eq!(
        kinds("a || b && !c | d"),
        vec![
            TokenKind::Identifier,
            TokenKind::Or,
            TokenKind::Identifier,
            TokenKind::And,
            TokenKind::Not,
            TokenKind::Identifier,
            TokenKind::Pipe,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_bracket_disambiguation() {
    assert_eq!(
        kinds("[] [? [0]"),
        vec![
            TokenKind::Flatten,
            TokenKind::Filter,
            TokenKind::LBracket,
            TokenKind::Number,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}
