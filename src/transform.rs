//! Grouping and aggregation (`TRANSFORMATIONS`).
//!
//! Rows are grouped by the tuple of their `GROUP` field values. Each group
//! collapses into one output row holding the group fields plus one value
//! per `APPLY` rule. Group fields and apply results live in separate maps,
//! so an apply key may share its name with a field.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use tracing::debug;

use crate::{
    ast::{ApplyRule, ApplyToken, ColumnRef, Transformation},
    value::{Row, Value, ValueKey},
};

/// Decimal places kept by `SUM` and `AVG`.
const AGGREGATE_SCALE: u32 = 2;

/// A row flowing from the transformer to the finalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkingRow<'r> {
    /// A source row passed through untouched.
    Source(&'r Row),
    /// One collapsed group.
    Group(GroupRow),
}

/// The output of one group: its `GROUP` field values, keyed by unqualified
/// field name, and its `APPLY` results, keyed by apply key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRow {
    pub fields: Row,
    pub aggregates: Row,
}

impl WorkingRow<'_> {
    /// Looks up the value a column reads from this row.
    pub fn get(&self, column: &ColumnRef) -> Option<&Value> {
        match (self, column) {
            (WorkingRow::Source(row), ColumnRef::Field(field)) => row.get(*field),
            (WorkingRow::Source(_), ColumnRef::Apply(_)) => None,
            (WorkingRow::Group(group), ColumnRef::Field(field)) => group.fields.get(*field),
            (WorkingRow::Group(group), ColumnRef::Apply(key)) => group.aggregates.get(key),
        }
    }
}

/// Applies `transformation` to the filtered rows.
///
/// Without a transformation the rows pass through untouched (still
/// borrowed). With one, every distinct combination of `GROUP` values
/// yields exactly one group row, in order of first appearance.
pub fn transform<'r>(
    rows: Vec<&'r Row>,
    transformation: Option<&Transformation>,
) -> Vec<WorkingRow<'r>> {
    let Some(transformation) = transformation else {
        return rows.into_iter().map(WorkingRow::Source).collect();
    };

    let groups = group_rows(&rows, &transformation.group);
    debug!(
        rows = rows.len(),
        groups = groups.len(),
        "rows grouped"
    );

    groups
        .iter()
        .map(|members| WorkingRow::Group(collapse_group(members, transformation)))
        .collect()
}

/// Partitions rows by their `GROUP` values.
///
/// The key is the tuple of values itself, so distinct combinations never
/// collide (`("1", "23")` and `("12", "3")` stay apart).
fn group_rows<'r>(rows: &[&'r Row], group: &[&'static str]) -> Vec<Vec<&'r Row>> {
    let mut index: HashMap<Vec<Option<ValueKey<'r>>>, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'r Row>> = Vec::new();

    for &row in rows {
        let key = group
            .iter()
            .map(|field| row.get(*field).map(Value::key))
            .collect::<Vec<_>>();

        match index.get(&key) {
            Some(&slot) => groups[slot].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups
}

fn collapse_group(members: &[&Row], transformation: &Transformation) -> GroupRow {
    let mut result = GroupRow::default();

    // every member shares the group values, so any one of them will do
    if let Some(representative) = members.first() {
        for field in &transformation.group {
            if let Some(value) = representative.get(*field) {
                result.fields.insert(field.to_string(), value.clone());
            }
        }
    }

    for rule in &transformation.apply {
        result
            .aggregates
            .insert(rule.key.clone(), aggregate(rule, members));
    }

    result
}

/// Computes one `APPLY` rule over a non-empty group.
pub fn aggregate(rule: &ApplyRule, members: &[&Row]) -> Value {
    let values = members.iter().filter_map(|row| row.get(rule.field));

    match rule.token {
        ApplyToken::Max => extremum(values, |a, b| b.compare(a).is_gt()),
        ApplyToken::Min => extremum(values, |a, b| b.compare(a).is_lt()),
        ApplyToken::Sum => {
            let values: Vec<&Value> = values.collect();
            match decimal_sum(&values) {
                Some(sum) => from_decimal(round(sum)),
                None => float_fallback(values.iter().filter_map(|v| v.as_float()).sum()),
            }
        }
        ApplyToken::Avg => {
            let values: Vec<&Value> = values.collect();
            if values.is_empty() {
                return Value::Integer(0);
            }
            let avg = decimal_sum(&values)
                .and_then(|sum| sum.checked_div(Decimal::from(values.len())));
            match avg {
                Some(avg) => from_decimal(round(avg)),
                None => {
                    let sum: f64 = values.iter().filter_map(|v| v.as_float()).sum();
                    float_fallback(sum / values.len() as f64)
                }
            }
        }
        ApplyToken::Count => {
            let distinct: HashSet<ValueKey<'_>> = values.map(Value::key).collect();
            Value::Integer(distinct.len() as i64)
        }
    }
}

/// Picks the numeric value `better` prefers over every other one.
fn extremum<'v>(
    values: impl Iterator<Item = &'v Value>,
    better: impl Fn(&Value, &Value) -> bool,
) -> Value {
    values
        .filter(|v| v.is_number())
        .fold(None::<&Value>, |best, v| match best {
            Some(b) if !better(b, v) => Some(b),
            _ => Some(v),
        })
        .cloned()
        .unwrap_or(Value::Integer(0))
}

/// Sums exactly in decimal. `None` if a value cannot be represented or the
/// sum overflows.
fn decimal_sum(values: &[&Value]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(to_decimal(v)?))
}

/// Converts through the shortest decimal representation, so `0.1` becomes
/// exactly `0.1` rather than its binary expansion.
fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Some(Decimal::from(*n)),
        Value::Float(n) => {
            Decimal::from_str(&n.to_string()).ok().or_else(|| Decimal::from_f64(*n))
        }
        Value::String(_) => None,
    }
}

fn round(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(AGGREGATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whole results come back as integers, everything else as floats.
fn from_decimal(d: Decimal) -> Value {
    if d.is_integer()
        && let Some(n) = d.to_i64()
    {
        return Value::Integer(n);
    }
    Value::Float(d.to_f64().unwrap_or_default())
}

fn float_fallback(n: f64) -> Value {
    Value::Float((n * 100.0).round() / 100.0)
}
