//! Error taxonomy shared by the lexer, parser, evaluator and function library.

use thiserror::Error;

/// Errors raised while compiling or evaluating an expression.
///
/// Lexing never fails on its own: unrecognized input becomes an `Unknown`
/// token and is reported by the parser as [`Error::Syntax`], carrying the
/// character offset of the offending token.
#[derive(Error, Debug)]
pub enum Error {
    /// Lexing or parsing failure.
    #[error("syntax error at position {position} in `{expression}`: {message}")]
    Syntax {
        message: String,
        expression: String,
        position: usize,
    },

    /// Wrong number of arguments passed to a built-in function.
    #[error("invalid arity: {0}")]
    InvalidArity(String),

    /// Argument of the wrong kind passed to a built-in function.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Structurally valid but unusable value, e.g. a slice step of zero.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Call to a function name that is not in the built-in table.
    #[error("unknown function: {0}()")]
    UnknownFunction(String),

    /// The host JSON decoder rejected the input document.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for errors raised by built-in functions during evaluation.
    ///
    /// These are the only errors a runtime configured with
    /// `disable_visit_errors` turns into an absent result.
    pub fn is_visit_error(&self) -> bool {
        matches!(self, Error::InvalidArity(_) | Error::InvalidType(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
