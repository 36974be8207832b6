//! Data model for tabular merges.
//!
//! Tables are ordered header lists plus rows of string fields. Merge behavior
//! is described by [`MergeSpec`] (vertical/horizontal) and [`AsOfSpec`]
//! (time-ordered nearest match).

pub mod column;
pub mod error;
pub mod report;
pub mod spec;
pub mod table;

pub use column::{ColumnRef, JoinMapping};
pub use error::{MergeError, Result, StructuralMismatch};
pub use report::{MergeReport, MergeStrategy, TableSummary};
pub use spec::{
    AsOfDirection, AsOfSpec, DEFAULT_SUFFIX, JoinMode, MatchPolicy, MergeMode, MergeSpec,
};
pub use table::{Row, Table};
