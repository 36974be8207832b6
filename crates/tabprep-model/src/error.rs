//! Error types for merge validation and execution.

use std::fmt;

use thiserror::Error;

use crate::column::ColumnRef;

/// A structural precondition failure detected before any join logic runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralMismatch {
    /// Header set differs from the first table in a vertical merge.
    HeaderSet {
        table: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },
    /// Row count differs from the primary table in a positional merge.
    RowCount {
        table: String,
        expected: usize,
        actual: usize,
    },
    /// The same header name appears more than once in one table.
    DuplicateHeaders {
        table: String,
        duplicates: Vec<String>,
    },
}

impl StructuralMismatch {
    /// Name of the table the mismatch was found in.
    pub fn table(&self) -> &str {
        match self {
            Self::HeaderSet { table, .. }
            | Self::RowCount { table, .. }
            | Self::DuplicateHeaders { table, .. } => table,
        }
    }
}

impl fmt::Display for StructuralMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderSet {
                table,
                missing,
                extra,
            } => write!(
                f,
                "header set of '{table}' differs from the first table (missing: [{}], extra: [{}])",
                missing.join(", "),
                extra.join(", ")
            ),
            Self::RowCount {
                table,
                expected,
                actual,
            } => write!(
                f,
                "'{table}' has {actual} rows but positional merge requires {expected}"
            ),
            Self::DuplicateHeaders { table, duplicates } => write!(
                f,
                "'{table}' contains duplicate headers: [{}]",
                duplicates.join(", ")
            ),
        }
    }
}

/// Errors raised while validating or executing a merge.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("structural mismatch: {0}")]
    StructuralMismatch(StructuralMismatch),

    /// A column reference could not be resolved against its table.
    #[error("unresolved column {column} in '{table}' (headers: [{}])", .headers.join(", "))]
    UnresolvedColumn {
        table: String,
        column: ColumnRef,
        headers: Vec<String>,
    },

    /// The merge eliminated every row although at least one input had rows.
    #[error(
        "merge of {inputs} tables produced no rows from {input_rows} input rows; check the key mappings"
    )]
    EmptyMergeResult { inputs: usize, input_rows: usize },

    #[error("invalid merge configuration: {0}")]
    InvalidSpec(String),

    /// Every issue found while validating one merge call.
    #[error("merge validation failed with {} issue(s): {}", .issues.len(), join_issues(.issues))]
    Validation { issues: Vec<MergeError> },
}

impl MergeError {
    /// Returns the individual issues, flattening an aggregate report.
    pub fn issues(&self) -> Vec<&MergeError> {
        match self {
            Self::Validation { issues } => issues.iter().flat_map(MergeError::issues).collect(),
            other => vec![other],
        }
    }
}

impl From<StructuralMismatch> for MergeError {
    fn from(mismatch: StructuralMismatch) -> Self {
        Self::StructuralMismatch(mismatch)
    }
}

fn join_issues(issues: &[MergeError]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
