use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::{
    ast::{
        ApplyRule, ColumnRef, Direction, Filter, NumericOp, Options, Order, Pattern, Plan,
        Transformation,
    },
    error::{QueryError, QueryResult},
    schema::{DatasetDescriptor, FieldType},
    validator::{
        self, ApplyKeys, ValidatedQuery, apply_body, group_fields, resolve_column, resolve_field,
        single_entry,
    },
};

/// Validates and compiles a raw query document in one step.
pub fn compile_query(raw: &JsonValue, datasets: &[DatasetDescriptor]) -> QueryResult<Plan> {
    let validated = validator::validate(raw, datasets)?;
    compile(&validated)
}

/// Compiles a validated query into an executable [`Plan`].
///
/// `WHERE` is checked node by node here: operator arity, operator/field
/// type agreement, literal types, and `IS` wildcard placement.
pub fn compile(validated: &ValidatedQuery<'_>) -> QueryResult<Plan> {
    let compiler = Compiler {
        dataset: &validated.dataset,
        apply_keys: &validated.apply_keys,
    };

    let filter = compiler.compile_where(validated.where_clause)?;
    let options = compiler.compile_options(validated.options)?;
    let transformation = validated
        .transformations
        .map(|t| compiler.compile_transformation(t))
        .transpose()?;

    debug!(dataset = %validated.dataset.id, ?filter, "query compiled");

    Ok(Plan {
        dataset: validated.dataset.clone(),
        filter,
        options,
        transformation,
    })
}

struct Compiler<'a> {
    dataset: &'a DatasetDescriptor,
    apply_keys: &'a ApplyKeys,
}

impl Compiler<'_> {
    fn compile_where(&self, where_clause: &Map<String, JsonValue>) -> QueryResult<Filter> {
        if where_clause.is_empty() {
            return Ok(Filter::All);
        }
        let mut entries = where_clause.iter();
        match (entries.next(), entries.next()) {
            (Some((op, body)), None) => self.compile_node(op, body),
            _ => Err(QueryError::invalid(format!(
                "WHERE should only have 1 key, has {}",
                where_clause.len()
            ))),
        }
    }

    /// Compiles one filter node `{ OP: body }`.
    fn compile_node(&self, op: &str, body: &JsonValue) -> QueryResult<Filter> {
        match op {
            "AND" => self.compile_children(op, body).map(Filter::And),
            "OR" => self.compile_children(op, body).map(Filter::Or),
            "NOT" => {
                let (inner_op, inner_body) = single_entry(body, "NOT")?;
                let inner = self.compile_node(inner_op, inner_body)?;
                Ok(Filter::Not(Box::new(inner)))
            }
            "IS" => self.compile_is(body),
            _ => match NumericOp::from_keyword(op) {
                Some(numeric) => self.compile_numeric(numeric, op, body),
                None => Err(QueryError::invalid(format!("Invalid filter key '{}'", op))),
            },
        }
    }

    fn compile_children(&self, op: &str, body: &JsonValue) -> QueryResult<Vec<Filter>> {
        let children = match body {
            JsonValue::Array(children) if !children.is_empty() => children,
            _ => {
                return Err(QueryError::invalid(format!(
                    "{} must be a non-empty array",
                    op
                )));
            }
        };

        children
            .iter()
            .map(|child| {
                let (child_op, child_body) = single_entry(child, op)?;
                self.compile_node(child_op, child_body)
            })
            .collect()
    }

    fn compile_numeric(&self, numeric: NumericOp, op: &str, body: &JsonValue) -> QueryResult<Filter> {
        let (reference, literal) = single_entry(body, op)?;
        let field = resolve_field(reference, self.dataset, op)?;

        if field.ty != FieldType::Numeric {
            return Err(QueryError::invalid(format!(
                "Invalid key type in {}: '{}' is not numeric",
                op, reference
            )));
        }

        let value = literal.as_f64().ok_or_else(|| {
            QueryError::invalid(format!("Invalid value type in {}: expected a number", op))
        })?;

        Ok(Filter::Numeric {
            op: numeric,
            field: field.name,
            value,
        })
    }

    fn compile_is(&self, body: &JsonValue) -> QueryResult<Filter> {
        let (reference, literal) = single_entry(body, "IS")?;
        let field = resolve_field(reference, self.dataset, "IS")?;

        if field.ty != FieldType::String {
            return Err(QueryError::invalid(format!(
                "Invalid key type in IS: '{}' is not a string field",
                reference
            )));
        }

        let raw = literal.as_str().ok_or_else(|| {
            QueryError::invalid("Invalid value type in IS: expected a string")
        })?;

        Ok(Filter::Is {
            field: field.name,
            pattern: compile_pattern(raw)?,
        })
    }

    fn compile_options(&self, options: &Map<String, JsonValue>) -> QueryResult<Options> {
        let columns = options
            .get("COLUMNS")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| QueryError::invalid("COLUMNS must be a non-empty array"))?
            .iter()
            .map(|c| self.column(c, "COLUMNS"))
            .collect::<QueryResult<Vec<_>>>()?;

        let order = match options.get("ORDER") {
            None | Some(JsonValue::Null) => None,
            Some(key @ JsonValue::String(_)) => Some(Order {
                direction: Direction::Up,
                keys: vec![self.column(key, "ORDER")?],
            }),
            Some(JsonValue::Object(order)) => {
                let direction = match order.get("dir").and_then(JsonValue::as_str) {
                    Some("UP") => Direction::Up,
                    Some("DOWN") => Direction::Down,
                    _ => return Err(QueryError::invalid("ORDER dir must be UP or DOWN")),
                };
                let keys = order
                    .get("keys")
                    .and_then(JsonValue::as_array)
                    .ok_or_else(|| QueryError::invalid("ORDER keys must be a non-empty array"))?
                    .iter()
                    .map(|k| self.column(k, "ORDER"))
                    .collect::<QueryResult<Vec<_>>>()?;
                Some(Order { direction, keys })
            }
            Some(_) => return Err(QueryError::invalid("Invalid ORDER type")),
        };

        Ok(Options { columns, order })
    }

    fn column(&self, reference: &JsonValue, area: &str) -> QueryResult<ColumnRef> {
        let reference = reference
            .as_str()
            .ok_or_else(|| QueryError::invalid(format!("Keys in {} must be strings", area)))?;
        resolve_column(reference, self.dataset, self.apply_keys, area)
    }

    fn compile_transformation(
        &self,
        transformations: &Map<String, JsonValue>,
    ) -> QueryResult<Transformation> {
        let group = group_fields(transformations, self.dataset)?;

        let apply = transformations
            .get("APPLY")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS missing APPLY"))?
            .iter()
            .map(|rule| {
                let (key, body) = single_entry(rule, "APPLY rule")?;
                let (token, reference) = apply_body(body)?;
                let field = resolve_field(reference, self.dataset, "APPLY")?;
                Ok(ApplyRule {
                    key: key.to_string(),
                    token,
                    field: field.name,
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Transformation { group, apply })
    }
}

/// Resolves the wildcards of an `IS` literal.
///
/// `*` is only legal as the first character, the last character, or both.
pub fn compile_pattern(raw: &str) -> QueryResult<Pattern> {
    let (leading, rest) = match raw.strip_prefix('*') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (trailing, text) = match rest.strip_suffix('*') {
        Some(text) => (true, text),
        None => (false, rest),
    };

    if text.contains('*') {
        return Err(QueryError::invalid(format!(
            "Asterisks (*) must be at the start or end of IS value '{}'",
            raw
        )));
    }

    let text = text.to_string();
    Ok(match (leading, trailing) {
        (true, true) => Pattern::Contains(text),
        (true, false) => Pattern::Suffix(text),
        (false, true) => Pattern::Prefix(text),
        (false, false) => Pattern::Exact(text),
    })
}
