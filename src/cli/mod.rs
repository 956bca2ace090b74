//! CLI support for insight-query
//!
//! Provides programmatic access to the `insight` command so it can be
//! embedded in other tools.

mod convert;
mod docs;
mod query;

pub use convert::{DatasetFile, json_to_row, json_to_value, parse_datasets};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use query::{QueryOptions, execute_query, load_catalog};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Query failed: {0}")]
    Query(#[from] crate::QueryError),

    #[error("Could not load dataset: {0}")]
    Catalog(#[from] crate::CatalogError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Dataset file does not have the expected shape
    #[error("Invalid dataset file: {0}")]
    InvalidDataset(String),

    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'insight docs' to see available categories.")]
    UnknownCategory(String),
}
