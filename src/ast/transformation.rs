use crate::schema::FieldType;

/// Aggregate tokens allowed in an `APPLY` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyToken {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl ApplyToken {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "MAX" => Some(Self::Max),
            "MIN" => Some(Self::Min),
            "AVG" => Some(Self::Avg),
            "SUM" => Some(Self::Sum),
            "COUNT" => Some(Self::Count),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Avg => "AVG",
            Self::Sum => "SUM",
            Self::Count => "COUNT",
        }
    }

    /// COUNT works on any field; everything else needs numbers.
    pub fn accepts(self, ty: FieldType) -> bool {
        matches!(self, Self::Count) || ty == FieldType::Numeric
    }
}

/// One compiled `APPLY` entry: `{ key: { TOKEN: field } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    pub key: String,
    pub token: ApplyToken,
    pub field: &'static str,
}

/// Compiled `TRANSFORMATIONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    /// Grouping fields, in declared order. Never empty.
    pub group: Vec<&'static str>,
    pub apply: Vec<ApplyRule>,
}
