pub mod ast;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod output;
pub mod schema;
pub mod sort;
pub mod transform;
pub mod validator;
pub mod value;

pub use ast::{Filter, Plan};
pub use catalog::Catalog;
pub use compiler::{compile, compile_query};
pub use engine::{DatasetSource, compile_and_execute, execute};
pub use error::{CatalogError, QueryError, QueryResult};
pub use output::{MAX_RESULTS, to_json, to_json_pretty};
pub use schema::{DatasetDescriptor, DatasetKind, FieldType};
pub use validator::{ApplyKeys, ValidatedQuery, validate};
pub use value::{ResultRow, Row, Value};
