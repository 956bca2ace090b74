//! Structural validation of raw query documents.
//!
//! The validator checks the top-level shape of a query, resolves which
//! dataset it targets, and validates `TRANSFORMATIONS` and `OPTIONS`
//! against that dataset's schema. `WHERE` is validated node by node as the
//! compiler builds the filter tree.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::ast::{ApplyToken, ColumnRef};
use crate::error::{QueryError, QueryResult};
use crate::schema::{DatasetDescriptor, Field};

type JsonObject = Map<String, JsonValue>;

const QUERY_KEYS: &[&str] = &["WHERE", "OPTIONS", "TRANSFORMATIONS"];
const OPTION_KEYS: &[&str] = &["COLUMNS", "ORDER"];
const TRANSFORMATION_KEYS: &[&str] = &["GROUP", "APPLY"];
const ORDER_KEYS: &[&str] = &["dir", "keys"];

/// Apply keys declared by a query's `APPLY` rules, in declaration order.
///
/// Built up one key at a time by [`ApplyKeys::declare`], which rejects
/// malformed and duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyKeys(Vec<String>);

impl ApplyKeys {
    /// Adds `key`, returning the extended set.
    pub fn declare(mut self, key: &str) -> QueryResult<Self> {
        if key.is_empty() {
            return Err(QueryError::invalid("Apply key cannot be empty"));
        }
        if key.contains('_') {
            return Err(QueryError::invalid(format!(
                "Apply key '{}' cannot contain an underscore",
                key
            )));
        }
        if self.contains(key) {
            return Err(QueryError::invalid(format!(
                "Duplicate apply key '{}'",
                key
            )));
        }
        self.0.push(key.to_string());
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A query document whose shape has been checked and whose target dataset
/// is known. Borrowed sections are handed to the compiler as-is.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<'q> {
    pub dataset: DatasetDescriptor,
    pub apply_keys: ApplyKeys,
    pub(crate) where_clause: &'q JsonObject,
    pub(crate) options: &'q JsonObject,
    pub(crate) transformations: Option<&'q JsonObject>,
}

/// Validates a raw query against the currently known datasets.
///
/// Checks run in a fixed order: top-level shape, dataset resolution,
/// `TRANSFORMATIONS`, then `OPTIONS` (columns may reference apply keys,
/// so those must be known first).
pub fn validate<'q>(
    raw: &'q JsonValue,
    datasets: &[DatasetDescriptor],
) -> QueryResult<ValidatedQuery<'q>> {
    let query = raw
        .as_object()
        .ok_or_else(|| QueryError::invalid("Query must be an object"))?;

    if let Some(key) = query.keys().find(|k| !QUERY_KEYS.contains(&k.as_str())) {
        return Err(QueryError::invalid(format!(
            "Excess key '{}' in query",
            key
        )));
    }

    let where_clause = match query.get("WHERE") {
        Some(JsonValue::Object(map)) => map,
        Some(_) => return Err(QueryError::invalid("WHERE must be an object")),
        None => return Err(QueryError::invalid("Missing WHERE")),
    };

    let options = match query.get("OPTIONS") {
        Some(JsonValue::Object(map)) => map,
        Some(_) => return Err(QueryError::invalid("OPTIONS must be an object")),
        None => return Err(QueryError::invalid("Missing OPTIONS")),
    };

    let columns = match options.get("COLUMNS") {
        Some(JsonValue::Array(columns)) if !columns.is_empty() => columns,
        Some(_) => {
            return Err(QueryError::invalid("COLUMNS must be a non-empty array"));
        }
        None => return Err(QueryError::invalid("Missing COLUMNS in OPTIONS")),
    };

    let transformations = match query.get("TRANSFORMATIONS") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(map)) => Some(map),
        Some(_) => {
            return Err(QueryError::invalid("TRANSFORMATIONS must be an object"));
        }
    };

    let dataset = resolve_dataset(columns, datasets)?;

    let apply_keys = match transformations {
        Some(t) => validate_transformations(t, &dataset)?,
        None => ApplyKeys::default(),
    };

    validate_options(options, &dataset, &apply_keys, transformations)?;

    debug!(
        dataset = %dataset.id,
        apply_keys = apply_keys.len(),
        "query validated"
    );

    Ok(ValidatedQuery {
        dataset,
        apply_keys,
        where_clause,
        options,
        transformations,
    })
}

/// The dataset a query targets is named by the qualifier of its first column.
fn resolve_dataset(
    columns: &[JsonValue],
    datasets: &[DatasetDescriptor],
) -> QueryResult<DatasetDescriptor> {
    let first = columns
        .first()
        .and_then(JsonValue::as_str)
        .ok_or_else(|| QueryError::invalid("Keys in COLUMNS must be strings"))?;

    let id = first.split('_').next().unwrap_or(first);

    datasets
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .ok_or_else(|| QueryError::invalid(format!("Dataset '{}' not added yet", id)))
}

/// Validates `GROUP` and `APPLY`, returning the declared apply keys.
fn validate_transformations(
    transformations: &JsonObject,
    dataset: &DatasetDescriptor,
) -> QueryResult<ApplyKeys> {
    if let Some(key) = transformations
        .keys()
        .find(|k| !TRANSFORMATION_KEYS.contains(&k.as_str()))
    {
        return Err(QueryError::invalid(format!(
            "Invalid key '{}' in TRANSFORMATIONS",
            key
        )));
    }

    let group = match transformations.get("GROUP") {
        Some(JsonValue::Array(group)) if !group.is_empty() => group,
        Some(_) => return Err(QueryError::invalid("GROUP must be a non-empty array")),
        None => return Err(QueryError::invalid("TRANSFORMATIONS missing GROUP")),
    };

    let apply = match transformations.get("APPLY") {
        Some(JsonValue::Array(apply)) => apply,
        Some(_) => return Err(QueryError::invalid("APPLY must be an array")),
        None => return Err(QueryError::invalid("TRANSFORMATIONS missing APPLY")),
    };

    let mut apply_keys = ApplyKeys::default();
    for rule in apply {
        let (key, body) = single_entry(rule, "APPLY rule")?;
        apply_keys = apply_keys.declare(key)?;
        let (token, field) = apply_body(body)?;
        let field = resolve_field(field, dataset, "APPLY")?;
        if !token.accepts(field.ty) {
            return Err(QueryError::invalid(format!(
                "Invalid key type in {}: '{}' is not numeric",
                token.keyword(),
                field.name
            )));
        }
    }

    for reference in group {
        let reference = reference
            .as_str()
            .ok_or_else(|| QueryError::invalid("Keys in GROUP must be strings"))?;
        resolve_field(reference, dataset, "GROUP")?;
    }

    Ok(apply_keys)
}

/// Splits an APPLY body `{ TOKEN: field }` into its token and field reference.
pub(crate) fn apply_body(body: &JsonValue) -> QueryResult<(ApplyToken, &str)> {
    let (token, field) = single_entry(body, "APPLY body")?;
    let token = ApplyToken::from_keyword(token).ok_or_else(|| {
        QueryError::invalid(format!("Invalid transformation operator '{}'", token))
    })?;
    let field = field.as_str().ok_or_else(|| {
        QueryError::invalid(format!("{} field must be a string", token.keyword()))
    })?;
    Ok((token, field))
}

fn validate_options(
    options: &JsonObject,
    dataset: &DatasetDescriptor,
    apply_keys: &ApplyKeys,
    transformations: Option<&JsonObject>,
) -> QueryResult<()> {
    if let Some(key) = options.keys().find(|k| !OPTION_KEYS.contains(&k.as_str())) {
        return Err(QueryError::invalid(format!(
            "Invalid key '{}' in OPTIONS",
            key
        )));
    }

    let columns = column_names(options)?;

    let group = match transformations {
        Some(t) => Some(group_fields(t, dataset)?),
        None => None,
    };

    for column in &columns {
        let column_ref = resolve_column(column, dataset, apply_keys, "COLUMNS")?;
        if let (Some(group), ColumnRef::Field(name)) = (&group, &column_ref)
            && !group.contains(name)
        {
            return Err(QueryError::invalid(format!(
                "Key '{}' in COLUMNS must be in GROUP or APPLY when TRANSFORMATIONS is present",
                column
            )));
        }
    }

    let in_scope = |key: &str| columns.contains(&key) || apply_keys.contains(key);

    match options.get("ORDER") {
        None | Some(JsonValue::Null) => Ok(()),
        Some(JsonValue::String(key)) => {
            if !in_scope(key) {
                return Err(QueryError::invalid(format!(
                    "ORDER key '{}' must be in COLUMNS or APPLY",
                    key
                )));
            }
            resolve_column(key, dataset, apply_keys, "ORDER").map(|_| ())
        }
        Some(JsonValue::Object(order)) => {
            if let Some(key) = order.keys().find(|k| !ORDER_KEYS.contains(&k.as_str())) {
                return Err(QueryError::invalid(format!(
                    "Invalid key '{}' in ORDER",
                    key
                )));
            }
            match order.get("dir").and_then(JsonValue::as_str) {
                Some("UP") | Some("DOWN") => {}
                _ => return Err(QueryError::invalid("ORDER dir must be UP or DOWN")),
            }
            let keys = match order.get("keys") {
                Some(JsonValue::Array(keys)) if !keys.is_empty() => keys,
                _ => {
                    return Err(QueryError::invalid("ORDER keys must be a non-empty array"));
                }
            };
            for key in keys {
                let key = key
                    .as_str()
                    .ok_or_else(|| QueryError::invalid("ORDER keys must be strings"))?;
                if !in_scope(key) {
                    return Err(QueryError::invalid(format!(
                        "ORDER key '{}' must be in COLUMNS or APPLY",
                        key
                    )));
                }
            }
            Ok(())
        }
        Some(_) => Err(QueryError::invalid("Invalid ORDER type")),
    }
}

fn column_names(options: &JsonObject) -> QueryResult<Vec<&str>> {
    options
        .get("COLUMNS")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| QueryError::invalid("COLUMNS must be a non-empty array"))?
        .iter()
        .map(|c| {
            c.as_str()
                .ok_or_else(|| QueryError::invalid("Keys in COLUMNS must be strings"))
        })
        .collect()
}

/// Unqualified `GROUP` fields of an already shape-checked TRANSFORMATIONS.
pub(crate) fn group_fields(
    transformations: &JsonObject,
    dataset: &DatasetDescriptor,
) -> QueryResult<Vec<&'static str>> {
    transformations
        .get("GROUP")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS missing GROUP"))?
        .iter()
        .map(|reference| {
            let reference = reference
                .as_str()
                .ok_or_else(|| QueryError::invalid("Keys in GROUP must be strings"))?;
            resolve_field(reference, dataset, "GROUP").map(|f| f.name)
        })
        .collect()
}

/// Resolves a qualified `<id>_<field>` reference to a schema field of the
/// target dataset.
pub(crate) fn resolve_field(
    reference: &str,
    dataset: &DatasetDescriptor,
    area: &str,
) -> QueryResult<Field> {
    let Some((id, name)) = reference.split_once('_') else {
        return Err(QueryError::invalid(format!(
            "Invalid key '{}' in {}",
            reference, area
        )));
    };

    if id != dataset.id {
        return Err(QueryError::invalid(format!(
            "Cannot query more than one dataset: '{}' in {} is not in '{}'",
            reference, area, dataset.id
        )));
    }

    dataset.kind.field(name).ok_or_else(|| {
        QueryError::invalid(format!("Invalid key '{}' in {}", reference, area))
    })
}

/// Resolves a column reference: a declared apply key, or a qualified field.
pub(crate) fn resolve_column(
    reference: &str,
    dataset: &DatasetDescriptor,
    apply_keys: &ApplyKeys,
    area: &str,
) -> QueryResult<ColumnRef> {
    if apply_keys.contains(reference) {
        return Ok(ColumnRef::Apply(reference.to_string()));
    }
    resolve_field(reference, dataset, area).map(|f| ColumnRef::Field(f.name))
}

/// Unpacks an object that must contain exactly one entry.
pub(crate) fn single_entry<'a>(
    value: &'a JsonValue,
    what: &str,
) -> QueryResult<(&'a str, &'a JsonValue)> {
    let map = value
        .as_object()
        .ok_or_else(|| QueryError::invalid(format!("{} must be an object", what)))?;
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(QueryError::invalid(format!(
            "{} should have exactly 1 key, has {}",
            what,
            map.len()
        ))),
    }
}
