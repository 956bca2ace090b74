use crate::{
    ast::{Filter, NumericOp},
    value::Row,
};

/// Evaluates a compiled filter against a single row.
///
/// Comparisons against a field the row does not carry, or that holds a
/// value of the other type class, never match.
///
/// # Examples
///
/// ```
/// use insight_query::ast::{Filter, NumericOp};
/// use insight_query::evaluator::evaluate;
/// use insight_query::{Row, Value};
///
/// let mut row = Row::new();
/// row.insert("avg".to_string(), Value::Float(91.5));
///
/// let filter = Filter::Numeric { op: NumericOp::GreaterThan, field: "avg", value: 90.0 };
/// assert!(evaluate(&filter, &row));
/// assert!(!evaluate(&Filter::Not(Box::new(filter)), &row));
/// ```
pub fn evaluate(filter: &Filter, row: &Row) -> bool {
    match filter {
        Filter::All => true,
        Filter::And(children) => children.iter().all(|child| evaluate(child, row)),
        Filter::Or(children) => children.iter().any(|child| evaluate(child, row)),
        Filter::Not(child) => !evaluate(child, row),
        Filter::Numeric { op, field, value } => {
            let Some(actual) = row.get(*field).and_then(|v| v.as_float()) else {
                return false;
            };
            match op {
                NumericOp::GreaterThan => actual > *value,
                NumericOp::LessThan => actual < *value,
                NumericOp::Equal => actual == *value,
            }
        }
        Filter::Is { field, pattern } => row
            .get(*field)
            .and_then(|v| v.as_str())
            .is_some_and(|actual| pattern.matches(actual)),
    }
}

/// Keeps the rows that satisfy `filter`, in their original order.
///
/// The result is always a fresh sequence, so later stages can reorder it
/// without touching the source table.
pub fn apply_filter<'r>(filter: &Filter, rows: &'r [Row]) -> Vec<&'r Row> {
    match filter {
        Filter::All => rows.iter().collect(),
        _ => rows.iter().filter(|row| evaluate(filter, row)).collect(),
    }
}
