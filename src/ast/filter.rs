/// Compiled `WHERE` predicate.
///
/// A closed union: logic nodes own their children, comparison nodes carry
/// an unqualified field name and a literal already checked against the
/// field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Identity filter from an empty `WHERE` (`{}`); matches every row
    All,

    /// Conjunction over a non-empty list of children
    ///
    /// # Example
    /// ```text
    /// {"AND": [{"GT": {"sections_avg": 90}}, {"IS": {"sections_dept": "cpsc"}}]}
    /// ```
    And(Vec<Filter>),

    /// Disjunction over a non-empty list of children
    Or(Vec<Filter>),

    /// Negation of exactly one child
    Not(Box<Filter>),

    /// `GT`, `LT` or `EQ` against a numeric field
    ///
    /// # Example
    /// ```text
    /// {"LT": {"rooms_seats": 50}}
    /// ```
    Numeric {
        op: NumericOp,
        field: &'static str,
        value: f64,
    },

    /// `IS` against a string field
    ///
    /// # Example
    /// ```text
    /// {"IS": {"sections_instructor": "*smith*"}}
    /// ```
    Is {
        field: &'static str,
        pattern: Pattern,
    },
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    /// Strictly greater than (`GT`)
    GreaterThan,
    /// Strictly less than (`LT`)
    LessThan,
    /// Equal (`EQ`)
    Equal,
}

impl NumericOp {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "GT" => Some(Self::GreaterThan),
            "LT" => Some(Self::LessThan),
            "EQ" => Some(Self::Equal),
            _ => None,
        }
    }
}

/// An `IS` pattern with its wildcards resolved.
///
/// `*` may only appear at the start, the end, or both ends of the raw
/// pattern; the compiler rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `cpsc` - exact match
    Exact(String),
    /// `cp*` - value starts with the text
    Prefix(String),
    /// `*sc` - value ends with the text
    Suffix(String),
    /// `*ps*` - value contains the text
    Contains(String),
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(s) => value == s,
            Pattern::Prefix(s) => value.starts_with(s.as_str()),
            Pattern::Suffix(s) => value.ends_with(s.as_str()),
            Pattern::Contains(s) => value.contains(s.as_str()),
        }
    }
}
