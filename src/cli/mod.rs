//! CLI support for jmes-lang
//!
//! Provides programmatic access to the `jmes` commands so they can be
//! embedded in other tools.

mod functions;
mod search;

pub use functions::{function_listing, signatures};
pub use search::{SearchOptions, SearchResult, execute_search};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Expression failed to compile or evaluate
    #[error("{0}")]
    Expression(#[from] crate::Error),

    /// Input document is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No input provided
    #[error("No input provided. Use --input, --file or pipe JSON to stdin.")]
    NoInput,
}
