//! Row grouping by key for equality lookups.

use std::collections::HashMap;

use tabprep_model::Row;

/// Row positions grouped by key.
///
/// Built in one pass; positions keep their original order inside a group
/// and groups keep the order in which their key first appeared.
#[derive(Debug, Clone, Default)]
pub struct TableIndex {
    groups: HashMap<String, Vec<usize>>,
    order: Vec<String>,
}

impl TableIndex {
    pub fn build<'r, I, F>(rows: I, mut key: F) -> Self
    where
        I: IntoIterator<Item = &'r Row>,
        F: FnMut(&Row) -> String,
    {
        let mut index = Self::default();
        for (pos, row) in rows.into_iter().enumerate() {
            let key = key(row);
            match index.groups.get_mut(&key) {
                Some(group) => group.push(pos),
                None => {
                    index.order.push(key.clone());
                    index.groups.insert(key, vec![pos]);
                }
            }
        }
        index
    }

    /// Row positions sharing `key`; empty when the key is unknown.
    pub fn get(&self, key: &str) -> &[usize] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Groups in first-appearance order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.get(key)))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|value| Row::from_pairs([("k", *value)]))
            .collect()
    }

    #[test]
    fn test_groups_are_stable() {
        let rows = rows(&["b", "a", "b", "c", "a", "b"]);
        let index = TableIndex::build(&rows, |row| row.value("k").to_string());

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("b"), [0, 2, 5]);
        assert_eq!(index.get("a"), [1, 4]);
        assert_eq!(index.get("zzz"), [] as [usize; 0]);
        let order: Vec<&str> = index.groups().map(|(key, _)| key).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_rows() {
        let index = TableIndex::build(&Vec::<Row>::new(), |row| row.value("k").to_string());
        assert!(index.is_empty());
        assert!(index.get("").is_empty());
    }
}
