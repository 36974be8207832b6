use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One record: header name to string value.
///
/// Rows built during a join may hold a subset or superset of their table's
/// headers until [`Table::finalize`] runs. A missing field reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Field value, or `""` when the field is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or_default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.cells.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Ordered headers plus ordered rows, tagged with a name used in error reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Builds a table from header names and positional row values.
    ///
    /// Values beyond the header count are dropped; short rows leave fields
    /// absent.
    pub fn from_records<H, R, V>(name: impl Into<String>, headers: H, records: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = records
            .into_iter()
            .map(|record| {
                Row::from_pairs(
                    headers
                        .iter()
                        .cloned()
                        .zip(record.into_iter().map(Into::into)),
                )
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|header| header == column)
    }

    pub fn header_set(&self) -> BTreeSet<&str> {
        self.headers.iter().map(String::as_str).collect()
    }

    /// Header names that occur more than once, in first-repeat order.
    pub fn duplicate_headers(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for header in &self.headers {
            if !seen.insert(header.as_str()) && !duplicates.contains(header) {
                duplicates.push(header.clone());
            }
        }
        duplicates
    }

    /// Values of one column in row order; absent fields read as `""`.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |row| row.value(column))
    }

    /// Values of each row in header order.
    pub fn records(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows
            .iter()
            .map(|row| self.headers.iter().map(|header| row.value(header)).collect())
    }

    /// Makes every row carry exactly the table's headers.
    ///
    /// Absent fields are filled with `""` and fields outside the header list
    /// are dropped.
    pub fn finalize(&mut self) {
        let headers: BTreeSet<&str> = self.headers.iter().map(String::as_str).collect();
        for row in &mut self.rows {
            row.cells.retain(|column, _| headers.contains(column.as_str()));
            for header in &headers {
                if !row.cells.contains_key(*header) {
                    row.cells.insert((*header).to_string(), String::new());
                }
            }
        }
    }
}
