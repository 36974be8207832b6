//! Merge configuration passed by callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnRef, JoinMapping};

/// Default suffix appended to colliding right-hand column names.
pub const DEFAULT_SUFFIX: &str = "_2";

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Union of rows from tables sharing one header set.
    #[default]
    Vertical,
    /// Column-wise combination, keyed or positional.
    Horizontal,
}

/// Which unmatched rows an equality join keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinMode {
    /// Left rows without a partner are emitted with empty right columns.
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, Self::Left | Self::Full)
    }

    /// Right rows without a partner are emitted with empty left columns.
    pub fn keeps_unmatched_right(self) -> bool {
        matches!(self, Self::Right | Self::Full)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::Left => "left",
            Self::Right => "right",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        })
    }
}

/// Vertical or horizontal merge across two or more tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSpec {
    #[serde(default)]
    pub mode: MergeMode,
    #[serde(default)]
    pub join: JoinMode,
    /// Key mappings; empty means a positional horizontal merge.
    #[serde(default)]
    pub keys: Vec<JoinMapping>,
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Accept a result with zero rows instead of reporting an error.
    #[serde(default)]
    pub allow_empty_result: bool,
}

impl Default for MergeSpec {
    fn default() -> Self {
        Self {
            mode: MergeMode::default(),
            join: JoinMode::default(),
            keys: Vec::new(),
            suffix: default_suffix(),
            allow_empty_result: false,
        }
    }
}

impl MergeSpec {
    pub fn vertical() -> Self {
        Self::default()
    }

    pub fn horizontal(join: JoinMode, keys: Vec<JoinMapping>) -> Self {
        Self {
            mode: MergeMode::Horizontal,
            join,
            keys,
            ..Self::default()
        }
    }

    pub fn positional() -> Self {
        Self::horizontal(JoinMode::default(), Vec::new())
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_allow_empty_result(mut self, allow: bool) -> Self {
        self.allow_empty_result = allow;
        self
    }

    pub fn is_positional(&self) -> bool {
        self.mode == MergeMode::Horizontal && self.keys.is_empty()
    }
}

/// Which side of the left timestamp an as-of join searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsOfDirection {
    /// Latest right row at or before the left time.
    #[default]
    Backward,
    /// Earliest right row at or after the left time.
    Forward,
    /// Right row with the smallest absolute time difference.
    Nearest,
}

impl fmt::Display for AsOfDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Backward => "backward",
            Self::Forward => "forward",
            Self::Nearest => "nearest",
        })
    }
}

/// How many right rows an as-of join emits per left row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Only the best candidate.
    #[default]
    Best,
    /// Every candidate satisfying direction and tolerance, in time order.
    All,
}

/// Configuration of a time-ordered nearest-match join between two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsOfSpec {
    pub left_time: ColumnRef,
    pub right_time: ColumnRef,
    #[serde(default)]
    pub direction: AsOfDirection,
    /// Maximum accepted distance in seconds; `None` accepts any distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_seconds: Option<f64>,
    /// Exact-match keys restricting candidates before the time search.
    #[serde(default)]
    pub by: Vec<JoinMapping>,
    /// Whether a right row with the same timestamp may match.
    #[serde(default = "default_true")]
    pub allow_exact_matches: bool,
    #[serde(default)]
    pub matches: MatchPolicy,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl AsOfSpec {
    pub fn new(left_time: impl Into<ColumnRef>, right_time: impl Into<ColumnRef>) -> Self {
        Self {
            left_time: left_time.into(),
            right_time: right_time.into(),
            direction: AsOfDirection::default(),
            tolerance_seconds: None,
            by: Vec::new(),
            allow_exact_matches: true,
            matches: MatchPolicy::default(),
            suffix: default_suffix(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: AsOfDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_tolerance_seconds(mut self, seconds: f64) -> Self {
        self.tolerance_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_by(mut self, by: Vec<JoinMapping>) -> Self {
        self.by = by;
        self
    }

    #[must_use]
    pub fn with_allow_exact_matches(mut self, allow: bool) -> Self {
        self.allow_exact_matches = allow;
        self
    }

    #[must_use]
    pub fn with_matches(mut self, matches: MatchPolicy) -> Self {
        self.matches = matches;
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}
