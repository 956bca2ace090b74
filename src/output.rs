//! Result projection and JSON rendering.
//!
//! [`finalize`] turns working rows into result rows keyed by the requested
//! column names and enforces the result-size cap. [`to_json`] and
//! [`to_json_pretty`] render result rows for the API layer and the CLI.
//!
//! # Examples
//!
//! ```
//! use insight_query::{ResultRow, Value};
//! use insight_query::output::to_json;
//!
//! let mut row = ResultRow::new();
//! row.push("sections_dept", Value::String("cpsc".to_string()));
//! row.push("maxAvg", Value::Integer(90));
//!
//! assert_eq!(to_json(&[row]), r#"[{"sections_dept":"cpsc","maxAvg":90}]"#);
//! ```

use serde_json::{Map, Number, Value as JsonValue};
use tracing::{debug, warn};

use crate::{
    ast::{ColumnRef, Plan},
    error::{QueryError, QueryResult},
    transform::WorkingRow,
    value::{ResultRow, Value},
};

/// Largest number of rows a query may return.
pub const MAX_RESULTS: usize = 5000;

/// Projects rows onto the requested columns.
///
/// Apply-key columns keep their name; field columns are re-qualified as
/// `<datasetId>_<field>`. Fails with [`QueryError::ResultTooLarge`] when
/// there are more than [`MAX_RESULTS`] rows.
pub fn finalize(rows: Vec<WorkingRow<'_>>, plan: &Plan) -> QueryResult<Vec<ResultRow>> {
    // projection keeps the row count
    if rows.len() > MAX_RESULTS {
        warn!(
            dataset = %plan.dataset.id,
            count = rows.len(),
            limit = MAX_RESULTS,
            "result too large"
        );
        return Err(QueryError::ResultTooLarge {
            count: rows.len(),
            limit: MAX_RESULTS,
        });
    }

    let projected: Vec<ResultRow> = rows.iter().map(|row| project_row(row, plan)).collect();
    debug!(rows = projected.len(), "results finalized");
    Ok(projected)
}

fn project_row(row: &WorkingRow<'_>, plan: &Plan) -> ResultRow {
    plan.options
        .columns
        .iter()
        .filter_map(|column| {
            let value = row.get(column)?.clone();
            let name = match column {
                ColumnRef::Apply(key) => key.clone(),
                ColumnRef::Field(field) => format!("{}_{}", plan.dataset.id, field),
            };
            Some((name, value))
        })
        .collect()
}

/// Converts a single value to JSON. Non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Integer(n) => JsonValue::Number((*n).into()),
        Value::Float(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
    }
}

/// Converts result rows to a JSON array of flat objects whose keys follow
/// `COLUMNS` order.
pub fn rows_to_json(rows: &[ResultRow]) -> JsonValue {
    JsonValue::Array(
        rows.iter()
            .map(|row| {
                JsonValue::Object(
                    row.iter()
                        .map(|(k, v)| (k.to_string(), value_to_json(v)))
                        .collect::<Map<String, JsonValue>>(),
                )
            })
            .collect(),
    )
}

/// Compact JSON text for result rows.
pub fn to_json(rows: &[ResultRow]) -> String {
    rows_to_json(rows).to_string()
}

/// Pretty-printed JSON text for result rows, 2-space indented.
pub fn to_json_pretty(rows: &[ResultRow]) -> String {
    // serializing a serde_json::Value cannot fail
    serde_json::to_string_pretty(&rows_to_json(rows)).unwrap_or_default()
}
