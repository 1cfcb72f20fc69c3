use std::fmt;

use crate::value::Value;

/// Lexical token types.
///
/// Token payloads (identifier names, numbers, literal values, comparator
/// symbols) live in [`Token::value`], so the type itself stays `Copy` and can
/// be matched against sets of expected types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unquoted field or function name
    ///
    /// # Examples
    /// ```text
    /// foo
    /// _private
    /// sort_by
    /// ```
    Identifier,

    /// Double-quoted field name, JSON-decoded
    ///
    /// # Examples
    /// ```text
    /// "with space"
    /// "é"
    /// ```
    QuotedIdentifier,

    /// Integer used in index and slice expressions
    Number,

    /// Raw string (`'...'`) or JSON literal (`` `...` ``)
    Literal,

    /// One of `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparator,

    /// `.`
    Dot,

    /// `*`
    Star,

    /// `[]`
    Flatten,

    /// `[?`
    Filter,

    /// `[`
    LBracket,

    /// `]`
    RBracket,

    /// `{`
    LBrace,

    /// `}`
    RBrace,

    /// `(`
    LParen,

    /// `)`
    RParen,

    /// `,`
    Comma,

    /// `:`
    Colon,

    /// `@`
    Current,

    /// `&`
    Expref,

    /// `|`
    Pipe,

    /// `||`
    Or,

    /// `&&`
    And,

    /// `!`
    Not,

    /// Anything the lexer could not make sense of
    Unknown,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Right binding power used by the Pratt loop.
    ///
    /// Terminators and operand tokens bind at 0 so they never continue an
    /// infix chain.
    pub fn binding_power(self) -> u8 {
        match self {
            TokenKind::Pipe => 1,
            TokenKind::Or => 2,
            TokenKind::And => 3,
            TokenKind::Comparator => 5,
            TokenKind::Flatten => 9,
            TokenKind::Star => 20,
            TokenKind::Filter => 21,
            TokenKind::Dot => 40,
            TokenKind::Not => 45,
            TokenKind::LBrace => 50,
            TokenKind::LBracket => 55,
            TokenKind::LParen => 60,
            TokenKind::Identifier
            | TokenKind::QuotedIdentifier
            | TokenKind::Number
            | TokenKind::Literal
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::Current
            | TokenKind::Expref
            | TokenKind::Unknown
            | TokenKind::Eof => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::QuotedIdentifier => "quoted_identifier",
            TokenKind::Number => "number",
            TokenKind::Literal => "literal",
            TokenKind::Comparator => "comparator",
            TokenKind::Dot => "dot",
            TokenKind::Star => "star",
            TokenKind::Flatten => "flatten",
            TokenKind::Filter => "filter",
            TokenKind::LBracket => "lbracket",
            TokenKind::RBracket => "rbracket",
            TokenKind::LBrace => "lbrace",
            TokenKind::RBrace => "rbrace",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::Current => "current",
            TokenKind::Expref => "expref",
            TokenKind::Pipe => "pipe",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::Not => "not",
            TokenKind::Unknown => "unknown",
            TokenKind::Eof => "eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text, integer, decoded literal or comparator symbol;
    /// `Null` for punctuation.
    pub value: Value,
    /// Character offset of the token's first character.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: Value, position: usize) -> Self {
        Token {
            kind,
            value,
            position,
        }
    }

    /// Punctuation token without a payload.
    pub fn bare(kind: TokenKind, position: usize) -> Self {
        Token::new(kind, Value::Null, position)
    }

    pub fn binding_power(&self) -> u8 {
        self.kind.binding_power()
    }
}
