//! Entry point tying parsing, optimization and evaluation together.

use std::sync::Arc;

use crate::{ast::Node, cache::CachingParser, error::Result, parser::Parser, value::Value};

/// Anything that turns expression text into a tree.
///
/// [`Parser`] parses every time; [`CachingParser`] memoizes. Custom
/// implementations can be plugged in with [`Runtime::with_parser`].
pub trait ExpressionParser: Send + Sync {
    fn parse(&self, expression: &str) -> Result<Arc<Node>>;
}

impl ExpressionParser for Parser {
    fn parse(&self, expression: &str) -> Result<Arc<Node>> {
        Parser::parse(self, expression).map(Arc::new)
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Memoize parsed trees by expression text
    pub cache_expressions: bool,
    /// Turn built-in arity and type errors into null results
    pub disable_visit_errors: bool,
    /// Entries the expression cache holds before it is cleared
    pub cache_capacity: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            cache_expressions: true,
            disable_visit_errors: false,
            cache_capacity: CachingParser::DEFAULT_CAPACITY,
        }
    }
}

/// Parses, optimizes and evaluates expressions.
///
/// A runtime is `Send + Sync` and meant to be shared; the crate-level
/// [`search`](crate::search) uses a process-wide default instance.
///
/// # Examples
///
/// ```
/// use jmes_lang::{Runtime, RuntimeOptions, Value};
///
/// let runtime = Runtime::new(RuntimeOptions::default());
/// let data = Value::from_json_str(r#"{"people": [{"age": 20}, {"age": 31}]}"#).unwrap();
/// let result = runtime.search("people[?age > `25`].age", &data).unwrap();
/// assert_eq!(result, Value::Array(vec![Value::Integer(31)]));
/// ```
pub struct Runtime {
    parser: Box<dyn ExpressionParser>,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        let parser = Parser::new().with_visit_errors_disabled(options.disable_visit_errors);
        let parser: Box<dyn ExpressionParser> = if options.cache_expressions {
            Box::new(CachingParser::with_capacity(parser, options.cache_capacity))
        } else {
            Box::new(parser)
        };
        Self { parser }
    }

    pub fn with_parser(parser: Box<dyn ExpressionParser>) -> Self {
        Self { parser }
    }

    /// Evaluates `expression` against `data`.
    pub fn search(&self, expression: &str, data: &Value) -> Result<Value> {
        self.compile(expression)?.search(data)
    }

    /// Parses and optimizes `expression` once for repeated evaluation.
    pub fn compile(&self, expression: &str) -> Result<CompiledExpression> {
        let root = self.parser.parse(expression)?;
        Ok(CompiledExpression {
            source: expression.to_string(),
            root: Arc::new(root.optimize()),
        })
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

/// An optimized expression ready to be evaluated against many documents.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    root: Arc<Node>,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn search(&self, data: &Value) -> Result<Value> {
        self.root.visit(data)
    }
}
