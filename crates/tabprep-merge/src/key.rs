//! Composite join keys.

use tabprep_model::{JoinMapping, Result, Row, Table};

/// Separates key components; never part of ordinary CSV data.
pub const KEY_SEPARATOR: char = '\u{1}';

/// Which side of a [`JoinMapping`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Key columns resolved once per table, read per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey {
    columns: Vec<String>,
}

impl JoinKey {
    /// Resolves the `side` references of `mappings` against `table`'s headers.
    pub fn resolve(table: &Table, mappings: &[JoinMapping], side: Side) -> Result<Self> {
        let columns = mappings
            .iter()
            .map(|mapping| {
                let column = match side {
                    Side::Left => &mapping.left,
                    Side::Right => &mapping.right,
                };
                column
                    .resolve(&table.name, &table.headers)
                    .map(str::to_string)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|key| key == column)
    }

    /// Key value of `row`; absent fields contribute `""`.
    pub fn value(&self, row: &Row) -> String {
        let mut key = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            key.push_str(row.value(column));
        }
        key
    }
}
