//! # Query Plan - Abstract Syntax Tree
//!
//! This module defines the typed plan a query document compiles into. The
//! plan is built fresh for every query, is immutable once compiled, and is
//! dropped after execution.
//!
//! ## Architecture Overview
//!
//! - **[filter]** - The `WHERE` predicate tree and `IS` patterns
//! - **[options]** - Projected columns and ordering
//! - **[transformation]** - `GROUP`/`APPLY` rules
//! - **[plan]** - The complete plan bound to its target dataset
//!
//! ## Query Documents
//!
//! ```text
//! {
//!   "WHERE": { "AND": [ { "GT": { "sections_avg": 90 } },
//!                       { "IS": { "sections_dept": "cp*" } } ] },
//!   "OPTIONS": {
//!     "COLUMNS": [ "sections_dept", "maxAvg" ],
//!     "ORDER": { "dir": "DOWN", "keys": [ "maxAvg" ] }
//!   },
//!   "TRANSFORMATIONS": {
//!     "GROUP": [ "sections_dept" ],
//!     "APPLY": [ { "maxAvg": { "MAX": "sections_avg" } } ]
//!   }
//! }
//! ```
//!
//! Field references inside a document are qualified with the dataset id
//! (`sections_avg`). The plan stores them unqualified; the finalizer puts
//! the qualifier back when it projects result rows. Apply keys are never
//! qualified.
pub mod filter;
pub mod options;
pub mod plan;
pub mod transformation;

pub use filter::{Filter, NumericOp, Pattern};
pub use options::{ColumnRef, Direction, Options, Order};
pub use plan::Plan;
pub use transformation::{ApplyRule, ApplyToken, Transformation};
