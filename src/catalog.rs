//! In-memory dataset catalog.
//!
//! Holds every loaded dataset as an immutable row snapshot. Adding or
//! removing a dataset swaps whole snapshots under a write lock, so a query
//! that already holds a snapshot is unaffected by later mutations.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value as JsonValue;
use tracing::info;

use crate::{
    engine::{self, DatasetSource},
    error::{CatalogError, QueryResult},
    schema::{DatasetDescriptor, DatasetKind, FieldType},
    value::{ResultRow, Row},
};

#[derive(Debug, Clone)]
struct Dataset {
    descriptor: DatasetDescriptor,
    rows: Arc<[Row]>,
}

/// The set of datasets available to queries, in insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    datasets: RwLock<Vec<Dataset>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dataset and returns the ids of all datasets now loaded.
    ///
    /// Every row must carry exactly the fields of `kind`, each holding a
    /// value of the field's type.
    pub fn add_dataset(
        &self,
        id: &str,
        kind: DatasetKind,
        rows: Vec<Row>,
    ) -> Result<Vec<String>, CatalogError> {
        validate_id(id)?;
        if rows.is_empty() {
            return Err(CatalogError::Empty(id.to_string()));
        }
        for (index, row) in rows.iter().enumerate() {
            check_row(id, kind, index, row)?;
        }

        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        if datasets.iter().any(|d| d.descriptor.id == id) {
            return Err(CatalogError::Duplicate(id.to_string()));
        }

        let descriptor = DatasetDescriptor {
            id: id.to_string(),
            kind,
            row_count: rows.len(),
        };
        info!(id, %kind, rows = descriptor.row_count, "dataset added");
        datasets.push(Dataset {
            descriptor,
            rows: rows.into(),
        });

        Ok(datasets.iter().map(|d| d.descriptor.id.clone()).collect())
    }

    /// Removes a dataset, returning its id.
    pub fn remove_dataset(&self, id: &str) -> Result<String, CatalogError> {
        validate_id(id)?;

        let mut datasets = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        let position = datasets
            .iter()
            .position(|d| d.descriptor.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        datasets.remove(position);

        info!(id, "dataset removed");
        Ok(id.to_string())
    }

    /// Descriptors of the loaded datasets, in insertion order.
    pub fn list_datasets(&self) -> Vec<DatasetDescriptor> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.descriptor.clone())
            .collect()
    }

    /// Runs a raw query document against the loaded datasets.
    pub fn perform_query(&self, raw: &JsonValue) -> QueryResult<Vec<ResultRow>> {
        engine::compile_and_execute(raw, self)
    }
}

impl DatasetSource for Catalog {
    fn list_datasets(&self) -> Vec<DatasetDescriptor> {
        Catalog::list_datasets(self)
    }

    fn rows(&self, id: &str) -> Option<Arc<[Row]>> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.descriptor.id == id)
            .map(|d| Arc::clone(&d.rows))
    }
}

/// Ids must be non-blank and free of the qualifier separator.
fn validate_id(id: &str) -> Result<(), CatalogError> {
    if id.trim().is_empty() || id.contains('_') {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn check_row(id: &str, kind: DatasetKind, index: usize, row: &Row) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidRow {
        id: id.to_string(),
        row: index,
        reason,
    };

    for field in kind.fields() {
        let value = row
            .get(field.name)
            .ok_or_else(|| invalid(format!("missing field '{}'", field.name)))?;
        let matches = match field.ty {
            FieldType::Numeric => value.is_number(),
            FieldType::String => value.as_str().is_some(),
        };
        if !matches {
            return Err(invalid(format!(
                "field '{}' holds a {}",
                field.name,
                value.type_name()
            )));
        }
    }

    if let Some(extra) = row.keys().find(|name| kind.field(name).is_none()) {
        return Err(invalid(format!("unexpected field '{}' for {}", extra, kind)));
    }

    Ok(())
}
