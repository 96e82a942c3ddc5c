//! CLI support for graphnav-lang
//!
//! Provides programmatic access to the `graphnav` commands so other tools can
//! evaluate expressions against JSON documents without spawning a process.

mod convert;
mod docs;
mod eval;

pub use convert::{json_to_value, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, EvalOutcome, execute_eval, execute_parse};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A `--var` argument without `=`
    #[error("Invalid variable binding: '{0}' (expected name=json)")]
    InvalidVariable(String),

    #[error("Unknown category: '{0}'\nRun 'graphnav docs' to see available categories.")]
    UnknownCategory(String),
}
