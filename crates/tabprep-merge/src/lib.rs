//! Merge engine for in-memory tables.
//!
//! This crate combines [`Table`](tabprep_model::Table)s in three ways:
//!
//! - **Vertical**: concatenation of tables sharing one header set
//! - **Horizontal**: equality join on key columns (inner, left, right, full),
//!   or row-by-row when no keys are given
//! - **As-of**: each left row matched to the right row nearest in time
//!
//! Multi-table horizontal merges fold left to right, and colliding column
//! names are suffixed consistently across the whole fold.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabprep_merge::merge;
//! use tabprep_model::{JoinMapping, JoinMode, MergeSpec};
//!
//! let spec = MergeSpec::horizontal(JoinMode::Full, vec![JoinMapping::same("id")]);
//! let merged = merge(&spec, &[people, scores])?;
//! ```

pub mod asof;
pub mod equality;
pub mod index;
pub mod key;
pub mod naming;
mod orchestrator;
pub mod timestamp;
pub mod validate;
pub mod vertical;

pub use index::TableIndex;
pub use key::{JoinKey, KEY_SEPARATOR, Side};
pub use naming::ColumnNamer;
pub use orchestrator::{
    asof_merge, asof_merge_tables, asof_merge_with_report, merge, merge_with_report,
};
pub use timestamp::Timestamp;
pub use validate::{validate_asof, validate_merge};
