use crate::ast::{Filter, Options, Transformation};
use crate::schema::DatasetDescriptor;

/// Complete compiled query.
///
/// Represents everything execution needs, bound to the single dataset the
/// query targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Target dataset, resolved from the first `COLUMNS` entry
    pub dataset: DatasetDescriptor,

    /// Row predicate (`Filter::All` for an empty `WHERE`)
    pub filter: Filter,

    pub options: Options,

    /// Grouping and aggregation, if requested
    pub transformation: Option<Transformation>,
}
