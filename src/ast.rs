//! # Expression Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the syntax tree for the query language,
//! a compact path language for selecting and reshaping JSON documents.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and the binding-power table used by the parser
//! - **[operators]** - Comparison operators
//! - **[nodes]** - Syntax tree nodes, including the forms only the optimizer builds
//!
//! Evaluation lives in [`crate::evaluator`] and rewriting in
//! [`crate::optimizer`]; both are inherent methods on [`Node`].
//!
//! ## Quick Start
//!
//! ```text
//! people[?age > `20`].name | sort(@)
//! ```
//!
//! This expression keeps the people older than 20 and returns their sorted names.
//!
//! ## Core Concepts
//!
//! ### Projections
//!
//! `[*]`, `*`, `[]`, `[?...]` and slices start a projection: the expression to
//! their right is evaluated against every element, and null results are
//! dropped.
//!
//! ```text
//! reservations[*].instances[*].state
//! ```
//!
//! ### Pipes
//!
//! `|` ends a projection. The right side sees the collected array as a whole.
//!
//! ```text
//! people[*].name | [0]
//! ```
//!
//! ### Literals
//!
//! - **Raw strings** `'text'` - taken verbatim, only `\'` is unescaped
//! - **JSON literals** `` `{"a": 1}` `` - any JSON value
//!
//! ### Expression references
//!
//! `&expr` produces a deferred expression for higher-order functions:
//!
//! ```text
//! sort_by(people, &age)
//! map(&name, people)
//! ```
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{FunctionCall, KeyValuePair, Node, Slice};
pub use operators::Comparator;
pub use tokens::{Token, TokenKind};
