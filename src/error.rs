use thiserror::Error;

/// Result type for query compilation and execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while compiling or executing a query.
///
/// Both kinds are deterministic for a given query and dataset state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Structural or semantic defect in the query document.
    ///
    /// Always raised before any row is read.
    #[error("Invalid query: {0}")]
    Validation(String),

    /// The pipeline produced more rows than a response may carry
    #[error("Too many results ({count} > {limit}). Try tightening your query conditions.")]
    ResultTooLarge { count: usize, limit: usize },
}

impl QueryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QueryError::Validation(msg.into())
    }
}

/// Errors raised by catalog mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Empty, whitespace-only, or underscore-containing id
    #[error("Invalid dataset id: '{0}'")]
    InvalidId(String),

    #[error("Dataset '{0}' has already been added")]
    Duplicate(String),

    #[error("Dataset '{0}' has not been added")]
    NotFound(String),

    #[error("Dataset '{0}' contains no rows")]
    Empty(String),

    /// A row is missing a schema field or carries the wrong value type
    #[error("Row {row} of dataset '{id}': {reason}")]
    InvalidRow {
        id: String,
        row: usize,
        reason: String,
    },
}
