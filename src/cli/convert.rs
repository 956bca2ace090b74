//! JSON -> dataset conversion for dataset files

use serde_json::Value as JsonValue;

use super::CliError;
use crate::{DatasetKind, Row, Value};

/// A dataset as read from a file, before it enters the catalog.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    pub id: String,
    pub kind: DatasetKind,
    pub rows: Vec<Row>,
}

/// Convert a JSON scalar to a row value. Only numbers and strings are cells.
pub fn json_to_value(v: &JsonValue) -> Option<Value> {
    match v {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => n.as_f64().map(Value::Float),
        },
        JsonValue::String(s) => Some(Value::String(s.clone())),
        _ => None,
    }
}

/// Convert a JSON object to a row.
pub fn json_to_row(v: &JsonValue) -> Result<Row, CliError> {
    let obj = v
        .as_object()
        .ok_or_else(|| CliError::InvalidDataset("rows must be objects".to_string()))?;

    obj.iter()
        .map(|(k, v)| {
            json_to_value(v).map(|value| (k.clone(), value)).ok_or_else(|| {
                CliError::InvalidDataset(format!(
                    "field '{}' must be a number or a string",
                    k
                ))
            })
        })
        .collect()
}

/// Parse dataset file contents: one `{id, kind, rows}` object or an array of them.
pub fn parse_datasets(v: &JsonValue) -> Result<Vec<DatasetFile>, CliError> {
    match v {
        JsonValue::Array(items) => items.iter().map(parse_dataset).collect(),
        single => Ok(vec![parse_dataset(single)?]),
    }
}

fn parse_dataset(v: &JsonValue) -> Result<DatasetFile, CliError> {
    let id = v
        .get("id")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| CliError::InvalidDataset("missing string 'id'".to_string()))?;

    let kind = v
        .get("kind")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| CliError::InvalidDataset(format!("dataset '{}' is missing 'kind'", id)))?;
    let kind = DatasetKind::from_name(kind).ok_or_else(|| {
        CliError::InvalidDataset(format!("dataset '{}' has unknown kind '{}'", id, kind))
    })?;

    let rows = v
        .get("rows")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| CliError::InvalidDataset(format!("dataset '{}' is missing 'rows'", id)))?
        .iter()
        .map(json_to_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DatasetFile {
        id: id.to_string(),
        kind,
        rows,
    })
}
