//! JMESPath-style queries over JSON documents.
//!
//! An expression goes through a Pratt parser into a [`Node`] tree, a rewrite
//! pass that fuses common shapes, and a tree-walking evaluator:
//!
//! ```
//! use jmes_lang::{search, Value};
//!
//! let data = Value::from_json_str(r#"{"foo": {"bar": [{"baz": 1}, {"baz": 2}]}}"#).unwrap();
//! let result = search("foo.bar[*].baz | [1]", &data).unwrap();
//! assert_eq!(result, Value::Integer(2));
//! ```

use std::sync::LazyLock;

pub mod ast;
pub mod cache;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod runtime;
pub mod stream;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Node, Token, TokenKind};
pub use cache::CachingParser;
pub use error::{Error, Result};
pub use lexer::{Lexer, tokenize};
pub use parser::Parser;
pub use runtime::{CompiledExpression, ExpressionParser, Runtime, RuntimeOptions};
pub use value::{Map, Value};

static DEFAULT_RUNTIME: LazyLock<Runtime> = LazyLock::new(Runtime::default);

/// Evaluates `expression` against `data` with the shared default runtime.
pub fn search(expression: &str, data: &Value) -> Result<Value> {
    DEFAULT_RUNTIME.search(expression, data)
}

/// Evaluates `expression` with a one-off runtime built from `options`.
pub fn search_with(expression: &str, data: &Value, options: RuntimeOptions) -> Result<Value> {
    Runtime::new(options).search(expression, data)
}
