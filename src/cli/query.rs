//! Load dataset files and run queries against them

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::{CliError, parse_datasets};
use crate::{Catalog, ResultRow};

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The query document (JSON text)
    pub query: Option<String>,
    /// Dataset files to load before querying
    pub data: Vec<PathBuf>,
}

/// Build a catalog from dataset files.
pub fn load_catalog(paths: &[PathBuf]) -> Result<Catalog, CliError> {
    let catalog = Catalog::new();

    for path in paths {
        let text = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&text)?;
        for dataset in parse_datasets(&json)? {
            debug!(path = %path.display(), id = %dataset.id, "loading dataset");
            catalog.add_dataset(&dataset.id, dataset.kind, dataset.rows)?;
        }
    }

    Ok(catalog)
}

/// Execute a query against the datasets named in `options`.
pub fn execute_query(options: &QueryOptions) -> Result<Vec<ResultRow>, CliError> {
    let query_text = options.query.as_ref().ok_or(CliError::NoInput)?;
    let query: serde_json::Value = serde_json::from_str(query_text)?;

    let catalog = load_catalog(&options.data)?;
    Ok(catalog.perform_query(&query)?)
}
