use serde::{Deserialize, Serialize};

use crate::spec::{JoinMode, MergeMode, MergeSpec};
use crate::table::Table;

/// Row and column counts of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

impl From<&Table> for TableSummary {
    fn from(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            rows: table.len(),
            columns: table.width(),
        }
    }
}

/// Which strategy a merge ran with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Vertical,
    Keyed,
    Positional,
    AsOf,
}

impl MergeStrategy {
    /// Strategy a [`MergeSpec`] selects.
    pub fn for_spec(spec: &MergeSpec) -> Self {
        match spec.mode {
            MergeMode::Vertical => Self::Vertical,
            MergeMode::Horizontal if spec.keys.is_empty() => Self::Positional,
            MergeMode::Horizontal => Self::Keyed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Keyed => "keyed",
            Self::Positional => "positional",
            Self::AsOf => "as-of",
        }
    }
}

/// Outcome of one merge call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub strategy: MergeStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinMode>,
    pub inputs: Vec<TableSummary>,
    pub output: TableSummary,
}

impl MergeReport {
    pub fn input_rows(&self) -> usize {
        self.inputs.iter().map(|input| input.rows).sum()
    }
}
