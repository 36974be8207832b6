//! Column references and key mappings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Identifies a column either by header name or by 0-based position.
///
/// In text form a value made only of ASCII digits is a position; anything
/// else is a name. Config files may use an integer for a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Resolves this reference to a header name of `headers`.
    pub fn resolve<'a>(&self, table: &str, headers: &'a [String]) -> Result<&'a str> {
        let found = match self {
            Self::Name(name) => headers.iter().find(|header| *header == name),
            Self::Index(index) => headers.get(*index),
        };
        found.map(String::as_str).ok_or_else(|| MergeError::UnresolvedColumn {
            table: table.to_string(),
            column: self.clone(),
            headers: headers.to_vec(),
        })
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "'{name}'"),
            Self::Index(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = value.parse() {
                return Self::Index(index);
            }
        }
        Self::Name(value.to_string())
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Correspondence between a left and a right key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinMapping {
    pub left: ColumnRef,
    pub right: ColumnRef,
    /// Header the key is written under in the output, replacing the left name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl JoinMapping {
    pub fn new(left: impl Into<ColumnRef>, right: impl Into<ColumnRef>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            output: None,
        }
    }

    /// Same column reference on both sides.
    pub fn same(column: impl Into<ColumnRef>) -> Self {
        let column = column.into();
        Self {
            left: column.clone(),
            right: column,
            output: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Parses `key`, `left:right` or `left:right:output`.
impl FromStr for JoinMapping {
    type Err = MergeError;

    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(':').map(str::trim).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(MergeError::InvalidSpec(format!(
                "empty component in key mapping '{value}'"
            )));
        }
        match parts.as_slice() {
            [key] => Ok(Self::same(*key)),
            [left, right] => Ok(Self::new(*left, *right)),
            [left, right, output] => Ok(Self::new(*left, *right).with_output(*output)),
            _ => Err(MergeError::InvalidSpec(format!(
                "key mapping '{value}' must be 'key', 'left:right' or 'left:right:output'"
            ))),
        }
    }
}
