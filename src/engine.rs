//! Query execution entry points.
//!
//! The pipeline is pure and synchronous:
//!
//! ```text
//! finalize(sort(transform(filter(rows, plan), plan), plan), plan)
//! ```
//!
//! Source rows are only ever borrowed, so any number of queries may run
//! against the same snapshot at once.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{
    ast::Plan,
    compiler,
    error::{QueryError, QueryResult},
    evaluator, output,
    schema::DatasetDescriptor,
    sort, transform,
    value::{ResultRow, Row},
};

/// Where the engine gets datasets from.
///
/// Implementations hand out immutable row snapshots; the engine never
/// mutates them and holds no locks while executing.
pub trait DatasetSource {
    /// Descriptors of every dataset currently known.
    fn list_datasets(&self) -> Vec<DatasetDescriptor>;

    /// Row snapshot of the dataset `id`, if it is loaded.
    fn rows(&self, id: &str) -> Option<Arc<[Row]>>;
}

/// Validates, compiles and runs a raw query document against `source`.
///
/// Validation failures are reported before any row is read.
pub fn compile_and_execute<S>(raw: &JsonValue, source: &S) -> QueryResult<Vec<ResultRow>>
where
    S: DatasetSource + ?Sized,
{
    let datasets = source.list_datasets();
    let plan = compiler::compile_query(raw, &datasets)?;

    let rows = source.rows(&plan.dataset.id).ok_or_else(|| {
        QueryError::invalid(format!("Dataset '{}' not added yet", plan.dataset.id))
    })?;

    execute(&plan, &rows)
}

/// Runs a compiled plan over the rows of its dataset.
pub fn execute(plan: &Plan, rows: &[Row]) -> QueryResult<Vec<ResultRow>> {
    let filtered = evaluator::apply_filter(&plan.filter, rows);
    debug!(
        dataset = %plan.dataset.id,
        scanned = rows.len(),
        matched = filtered.len(),
        "rows filtered"
    );

    let mut transformed = transform::transform(filtered, plan.transformation.as_ref());
    sort::sort(&mut transformed, plan.options.order.as_ref());

    output::finalize(transformed, plan)
}
