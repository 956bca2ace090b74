/// A column reference after qualifier stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Schema field of the target dataset (`sections_avg` → `Field("avg")`)
    Field(&'static str),
    /// Apply key declared in `TRANSFORMATIONS` (kept verbatim)
    Apply(String),
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Ordering requested by `OPTIONS.ORDER`.
///
/// A bare string order compiles to a single ascending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub direction: Direction,
    pub keys: Vec<ColumnRef>,
}

/// Compiled `OPTIONS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Projected columns, in output order. Never empty.
    pub columns: Vec<ColumnRef>,
    pub order: Option<Order>,
}
