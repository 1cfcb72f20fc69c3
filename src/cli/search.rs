//! Evaluate an expression against JSON input

use super::CliError;
use crate::{Runtime, RuntimeOptions, Value};

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Turn function arity and type errors into null
    pub disable_errors: bool,
    /// Parse without the expression cache
    pub no_cache: bool,
}

/// Result of a search operation
#[derive(Debug)]
pub enum SearchResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully with JSON output
    Success(serde_json::Value),
}

/// Execute a search operation
pub fn execute_search(options: &SearchOptions) -> Result<SearchResult, CliError> {
    let runtime = Runtime::new(RuntimeOptions {
        cache_expressions: !options.no_cache,
        disable_visit_errors: options.disable_errors,
        ..RuntimeOptions::default()
    });
    let compiled = runtime.compile(&options.expression)?;

    if options.syntax_only {
        return Ok(SearchResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;

    let result = compiled.search(&Value::from(json_value))?;
    Ok(SearchResult::Success(serde_json::Value::from(&result)))
}
