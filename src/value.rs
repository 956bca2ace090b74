use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Index;

/// A single cell of a dataset row.
///
/// Rows only ever hold numbers and strings. Numbers keep the distinction
/// between integers and floats that the source data carried, so integral
/// fields like `year` or `seats` come back out as integers.
///
/// # Examples
///
/// ```
/// use insight_query::Value;
///
/// let avg = Value::Float(87.5);
/// let year = Value::Integer(2015);
/// let dept = Value::String("cpsc".to_string());
///
/// assert!(year.is_number());
/// assert_eq!(dept.as_str(), Some("cpsc"));
/// assert_eq!(avg.as_float(), Some(87.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),
}

/// A dataset row: field name to value.
pub type Row = HashMap<String, Value>;

/// Hashable identity of a value, used for grouping and distinct counting.
///
/// Integers and integral floats share the exact `Integer` key, so `90` and
/// `90.0` match while distinct large integers never do. Other floats are
/// keyed by their bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKey<'a> {
    Integer(i64),
    Float(u64),
    String(&'a str),
}

/// A projected result row: column name to value, in `COLUMNS` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow(Vec<(String, Value)>);

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. A column already present keeps its first value.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if self.get(&column).is_none() {
            self.0.push((column, value));
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Columns and values, in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl Index<&str> for ResultRow {
    type Output = Value;

    fn index(&self, column: &str) -> &Value {
        self.get(column)
            .unwrap_or_else(|| panic!("no column '{}' in result row", column))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = ResultRow::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

impl Value {
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn key(&self) -> ValueKey<'_> {
        match self {
            Value::String(s) => ValueKey::String(s),
            Value::Integer(n) => ValueKey::Integer(*n),
            // i64::MAX as f64 is 2^63, one past the largest i64
            Value::Float(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 =>
            {
                ValueKey::Integer(*n as i64)
            }
            Value::Float(n) => ValueKey::Float(n.to_bits()),
        }
    }

    /// Total order used by the sorter: numbers numerically, strings
    /// lexicographically. Mixed types compare equal.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) => match (a.as_float(), b.as_float()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
