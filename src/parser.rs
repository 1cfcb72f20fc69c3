use std::sync::Arc;

use crate::{
    ast::{Comparator, FunctionCall, KeyValuePair, Node, Slice, Token, TokenKind},
    error::{Error, Result},
    functions,
    lexer,
    stream::TokenStream,
    value::Value,
};

/// Tokens allowed after `.`
const AFTER_DOT: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::QuotedIdentifier,
    TokenKind::Star,
    TokenKind::LBrace,
    TokenKind::LBracket,
    TokenKind::Filter,
];
const NUM_COLON_RBRACKET: &[TokenKind] =
    &[TokenKind::Number, TokenKind::Colon, TokenKind::RBracket];
const COLON_RBRACKET: &[TokenKind] = &[TokenKind::Colon, TokenKind::RBracket];
const HASH_KEYS: &[TokenKind] = &[TokenKind::Identifier, TokenKind::QuotedIdentifier];

/// Projection right-hand sides stop at tokens binding below this.
const PROJECTION_STOP: u8 = 10;

/// Pratt parser turning expression text into an unoptimized [`Node`] tree.
///
/// # Examples
///
/// ```
/// use jmes_lang::{Parser, ast::Node};
///
/// let node = Parser::new().parse("foo.bar").unwrap();
/// assert_eq!(
///     node,
///     Node::subexpression(Node::Field("foo".into()), Node::Field("bar".into()))
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    disable_visit_errors: bool,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Function nodes built by this parser return null instead of raising
    /// arity and type errors.
    pub fn with_visit_errors_disabled(mut self, disabled: bool) -> Self {
        self.disable_visit_errors = disabled;
        self
    }

    /// Parses a complete expression. Trailing tokens are a syntax error.
    pub fn parse(&self, expression: &str) -> Result<Node> {
        log::trace!("parsing `{}`", expression);
        let mut stream = TokenStream::new(expression, lexer::tokenize(expression));
        let node = self.expr(&mut stream, 0)?;

        if stream.kind() != TokenKind::Eof {
            return Err(stream.error(format!(
                "unexpected {} after a complete expression",
                describe(stream.token())
            )));
        }
        Ok(node)
    }

    /// Precedence climbing: prefix rule, then infix rules while the next
    /// token binds tighter than `rbp`.
    fn expr(&self, stream: &mut TokenStream, rbp: u8) -> Result<Node> {
        let mut left = self.nud(stream)?;
        while rbp < stream.token().binding_power() {
            left = self.led(stream, left)?;
        }
        Ok(left)
    }

    /// Prefix-position rules.
    fn nud(&self, stream: &mut TokenStream) -> Result<Node> {
        match stream.kind() {
            TokenKind::Current => {
                stream.advance();
                Ok(Node::Current)
            }
            TokenKind::Expref => {
                stream.advance();
                let child = self.expr(stream, TokenKind::Expref.binding_power())?;
                Ok(Node::Expression(Arc::new(child)))
            }
            TokenKind::Not => {
                stream.advance();
                let child = self.expr(stream, TokenKind::Not.binding_power())?;
                Ok(Node::Not(Box::new(child)))
            }
            TokenKind::LParen => {
                stream.advance();
                let node = self.expr(stream, 0)?;
                if stream.kind() != TokenKind::RParen {
                    return Err(stream.error("unclosed `(`"));
                }
                stream.advance();
                Ok(node)
            }
            TokenKind::Filter => self.led_filter(stream, Node::Current),
            TokenKind::Flatten => self.led_flatten(stream, Node::Current),
            TokenKind::Identifier => {
                let name = token_text(stream.token());
                stream.advance();
                if stream.kind() == TokenKind::LParen {
                    self.parse_function(stream, name)
                } else {
                    Ok(Node::Field(name))
                }
            }
            TokenKind::QuotedIdentifier => {
                let name = token_text(stream.token());
                stream.advance();
                if stream.kind() == TokenKind::LParen {
                    return Err(stream.error("quoted identifiers are not allowed for function names"));
                }
                Ok(Node::Field(name))
            }
            TokenKind::Literal => {
                let value = stream.token().value.clone();
                stream.advance();
                Ok(Node::Literal(value))
            }
            TokenKind::LBrace => self.parse_multi_select_hash(stream),
            TokenKind::LBracket => {
                stream.advance();
                match stream.kind() {
                    TokenKind::Number | TokenKind::Colon => self.parse_index_expression(stream),
                    TokenKind::Star if stream.lookahead(1).kind == TokenKind::RBracket => {
                        self.parse_wildcard_array(stream, Node::Current)
                    }
                    _ => self.parse_multi_select_list(stream),
                }
            }
            TokenKind::Star => self.parse_wildcard_object(stream, Node::Current),
            TokenKind::Unknown => Err(stream.error(format!(
                "unknown token `{}`",
                token_text(stream.token())
            ))),
            TokenKind::Eof => Err(stream.error("unexpected end of expression")),
            TokenKind::Number
            | TokenKind::Comparator
            | TokenKind::Dot
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::Pipe
            | TokenKind::Or
            | TokenKind::And => Err(stream.error(format!(
                "unexpected {}",
                describe(stream.token())
            ))),
        }
    }

    /// Infix-position rules.
    fn led(&self, stream: &mut TokenStream, left: Node) -> Result<Node> {
        match stream.kind() {
            TokenKind::Comparator => {
                let symbol = token_text(stream.token());
                let comparator = Comparator::from_symbol(&symbol)
                    .ok_or_else(|| stream.error(format!("invalid comparator `{}`", symbol)))?;
                stream.advance();
                let right = self.expr(stream, TokenKind::Comparator.binding_power())?;
                Ok(Node::comparator(comparator, left, right))
            }
            TokenKind::Dot => {
                stream.advance_matching(AFTER_DOT)?;
                if stream.kind() == TokenKind::Star {
                    self.parse_wildcard_object(stream, left)
                } else {
                    let right = self.parse_dot(stream, TokenKind::Dot.binding_power())?;
                    Ok(Node::subexpression(left, right))
                }
            }
            TokenKind::Filter => self.led_filter(stream, left),
            TokenKind::Flatten => self.led_flatten(stream, left),
            TokenKind::LBracket => {
                stream.advance_matching(&[TokenKind::Number, TokenKind::Colon, TokenKind::Star])?;
                if stream.kind() == TokenKind::Star {
                    self.parse_wildcard_array(stream, left)
                } else {
                    let right = self.parse_index_expression(stream)?;
                    Ok(Node::subexpression(left, right))
                }
            }
            // Function names are consumed together with their argument list,
            // so any other `(` in infix position is misplaced.
            TokenKind::LParen => Err(stream.error("invalid function invocation")),
            TokenKind::Or => {
                stream.advance();
                let right = self.expr(stream, TokenKind::Or.binding_power())?;
                Ok(Node::or(left, right))
            }
            TokenKind::And => {
                stream.advance();
                let right = self.expr(stream, TokenKind::And.binding_power())?;
                Ok(Node::and(left, right))
            }
            TokenKind::Pipe => {
                stream.advance();
                let right = self.expr(stream, TokenKind::Pipe.binding_power())?;
                Ok(Node::pipe(left, right))
            }
            _ => Err(stream.error(format!("unexpected {}", describe(stream.token())))),
        }
    }

    fn led_filter(&self, stream: &mut TokenStream, left: Node) -> Result<Node> {
        stream.advance(); // consume `[?`
        let test = self.expr(stream, 0)?;
        if stream.kind() != TokenKind::RBracket {
            return Err(stream.error("expected `]` to close the filter expression"));
        }
        stream.advance();
        let body = self.parse_projection(stream, TokenKind::Filter.binding_power())?;
        Ok(Node::array_projection(left, Node::condition(test, body)))
    }

    fn led_flatten(&self, stream: &mut TokenStream, left: Node) -> Result<Node> {
        stream.advance(); // consume `[]`
        let body = self.parse_projection(stream, TokenKind::Flatten.binding_power())?;
        Ok(Node::array_projection(Node::Flatten(Box::new(left)), body))
    }

    /// Parses `name(arg, ...)` with the stream positioned on `(`.
    fn parse_function(&self, stream: &mut TokenStream, name: String) -> Result<Node> {
        stream.advance(); // consume `(`
        let mut args = Vec::new();

        while stream.kind() != TokenKind::RParen {
            args.push(self.expr(stream, 0)?);
            match stream.kind() {
                TokenKind::Comma => {
                    stream.advance();
                }
                TokenKind::RParen => {}
                _ => {
                    return Err(stream.error(format!(
                        "expected `,` or `)` in arguments to {}(), got {}",
                        name,
                        describe(stream.token())
                    )));
                }
            }
        }
        stream.advance(); // consume `)`

        if functions::lookup(&name).is_none() {
            return Err(Error::UnknownFunction(name));
        }
        Ok(Node::Function(FunctionCall {
            name,
            args,
            disable_visit_errors: self.disable_visit_errors,
        }))
    }

    /// Parses `[n]`, `[start:stop]` or `[start:stop:step]` with the stream
    /// positioned on the first token after `[`.
    fn parse_index_expression(&self, stream: &mut TokenStream) -> Result<Node> {
        let mut parts: [Option<i64>; 3] = [None; 3];
        let mut colons = 0;

        loop {
            let expected = match stream.kind() {
                TokenKind::Colon => {
                    colons += 1;
                    if colons > 2 {
                        return Err(stream.error("invalid slice syntax: too many colons"));
                    }
                    NUM_COLON_RBRACKET
                }
                TokenKind::Number => {
                    parts[colons] = stream.token().value.as_int();
                    COLON_RBRACKET
                }
                _ => NUM_COLON_RBRACKET,
            };
            stream.advance_matching(expected)?;
            if stream.kind() == TokenKind::RBracket {
                break;
            }
        }
        stream.advance(); // consume `]`

        if colons == 0 {
            let index = parts[0].ok_or_else(|| stream.error("expected an array index"))?;
            return Ok(Node::Index(index));
        }

        let slice = Slice::new(parts[0], parts[1], parts[2])?;
        let body = self.parse_projection(stream, TokenKind::Star.binding_power())?;
        Ok(Node::array_projection(Node::Slice(slice), body))
    }

    /// Right side of a `.`: a multi-select list for `.[`, else an expression.
    fn parse_dot(&self, stream: &mut TokenStream, binding_power: u8) -> Result<Node> {
        if stream.kind() == TokenKind::LBracket {
            stream.advance();
            self.parse_multi_select_list(stream)
        } else {
            self.expr(stream, binding_power)
        }
    }

    /// The expression applied to each element of a projection.
    fn parse_projection(&self, stream: &mut TokenStream, binding_power: u8) -> Result<Node> {
        if stream.token().binding_power() < PROJECTION_STOP {
            return Ok(Node::Current);
        }
        match stream.kind() {
            TokenKind::Dot => {
                stream.advance_matching(AFTER_DOT)?;
                self.parse_dot(stream, binding_power)
            }
            TokenKind::LBracket | TokenKind::Filter => self.expr(stream, binding_power),
            _ => Err(stream.error(format!(
                "unexpected {} after projection",
                describe(stream.token())
            ))),
        }
    }

    /// `[*]` with the stream positioned on `*`.
    fn parse_wildcard_array(&self, stream: &mut TokenStream, left: Node) -> Result<Node> {
        stream.advance_matching(&[TokenKind::RBracket])?;
        stream.advance();
        let body = self.parse_projection(stream, TokenKind::Star.binding_power())?;
        Ok(Node::array_projection(left, body))
    }

    /// `*` with the stream positioned on `*`.
    fn parse_wildcard_object(&self, stream: &mut TokenStream, left: Node) -> Result<Node> {
        stream.advance();
        let body = self.parse_projection(stream, TokenKind::Star.binding_power())?;
        Ok(Node::object_projection(left, body))
    }

    /// `[a, b, ...]` with the stream positioned on the first element.
    fn parse_multi_select_list(&self, stream: &mut TokenStream) -> Result<Node> {
        let mut nodes = Vec::new();
        loop {
            nodes.push(self.expr(stream, 0)?);
            match stream.kind() {
                TokenKind::Comma => {
                    stream.advance();
                    if stream.kind() == TokenKind::RBracket {
                        return Err(stream.error("expected an expression, found `]`"));
                    }
                }
                TokenKind::RBracket => break,
                _ => {
                    return Err(stream.error(format!(
                        "expected `,` or `]`, got {}",
                        describe(stream.token())
                    )));
                }
            }
        }
        stream.advance(); // consume `]`
        Ok(Node::MultiSelectList(nodes))
    }

    /// `{key: expr, ...}` with the stream positioned on `{`.
    fn parse_multi_select_hash(&self, stream: &mut TokenStream) -> Result<Node> {
        stream.advance_matching(HASH_KEYS)?;
        let mut pairs = Vec::new();
        loop {
            let key = token_text(stream.token());
            stream.advance_matching(&[TokenKind::Colon])?;
            stream.advance();
            let value = self.expr(stream, 0)?;
            pairs.push(KeyValuePair { key, value });

            match stream.kind() {
                TokenKind::Comma => {
                    stream.advance_matching(HASH_KEYS)?;
                }
                TokenKind::RBrace => break,
                _ => {
                    return Err(stream.error(format!(
                        "expected `,` or `}}`, got {}",
                        describe(stream.token())
                    )));
                }
            }
        }
        stream.advance(); // consume `}`
        Ok(Node::MultiSelectHash(pairs))
    }
}

/// Payload text of identifier, comparator and unknown tokens.
fn token_text(token: &Token) -> String {
    match &token.value {
        Value::String(s) => s.clone(),
        Value::Null => token.kind.name().to_string(),
        other => other.to_json_string(),
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::Unknown => {
            format!("{} `{}`", token.kind, token_text(token))
        }
        kind => kind.to_string(),
    }
}
