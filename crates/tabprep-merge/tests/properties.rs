//! Property tests for merge cardinality.

use std::collections::HashMap;

use proptest::prelude::*;

use tabprep_merge::{equality, merge, vertical};
use tabprep_model::{JoinMapping, JoinMode, MergeSpec, Table};

/// Key values drawn from a small space so that keys repeat and overlap.
fn arb_keys(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-d]", 0..=max_len)
}

fn keyed_table(name: &str, value_column: &str, keys: &[String]) -> Table {
    Table::from_records(
        name,
        ["id", value_column],
        keys.iter()
            .enumerate()
            .map(|(pos, key)| [key.clone(), pos.to_string()]),
    )
}

fn counts(keys: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    counts
}

fn joined(left: &[String], right: &[String], mode: JoinMode) -> Table {
    equality::join(
        &keyed_table("l", "x", left),
        &keyed_table("r", "y", right),
        &[JoinMapping::same("id")],
        mode,
        "_2",
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_vertical_row_count_is_sum(
        sizes in proptest::collection::vec(0usize..6, 2..5)
    ) {
        let tables: Vec<Table> = sizes
            .iter()
            .enumerate()
            .map(|(n, &size)| {
                Table::from_records(
                    format!("t{n}"),
                    ["a", "b"],
                    (0..size).map(|i| [i.to_string(), n.to_string()]),
                )
            })
            .collect();
        let merged = vertical::merge(&tables).unwrap();
        prop_assert_eq!(merged.len(), sizes.iter().sum::<usize>());
    }

    #[test]
    fn prop_inner_join_cardinality(left in arb_keys(8), right in arb_keys(8)) {
        let right_counts = counts(&right);
        let expected: usize = left
            .iter()
            .map(|key| right_counts.get(key.as_str()).copied().unwrap_or(0))
            .sum();
        prop_assert_eq!(joined(&left, &right, JoinMode::Inner).len(), expected);
    }

    #[test]
    fn prop_left_join_keeps_every_left_row(left in arb_keys(8), right in arb_keys(8)) {
        let result = joined(&left, &right, JoinMode::Left);
        let right_counts = counts(&right);
        let expected: usize = left
            .iter()
            .map(|key| right_counts.get(key.as_str()).copied().unwrap_or(1))
            .sum();
        prop_assert_eq!(result.len(), expected);
        // every left row index appears at least once
        for pos in 0..left.len() {
            let value = pos.to_string();
            prop_assert!(result.column_values("x").any(|x| x == value));
        }
    }

    #[test]
    fn prop_full_join_is_inner_plus_unmatched(left in arb_keys(8), right in arb_keys(8)) {
        let left_counts = counts(&left);
        let right_counts = counts(&right);
        let inner = joined(&left, &right, JoinMode::Inner).len();
        let left_only = left
            .iter()
            .filter(|key| !right_counts.contains_key(key.as_str()))
            .count();
        let right_only = right
            .iter()
            .filter(|key| !left_counts.contains_key(key.as_str()))
            .count();
        prop_assert_eq!(
            joined(&left, &right, JoinMode::Full).len(),
            inner + left_only + right_only
        );
    }

    #[test]
    fn prop_rows_carry_every_header(left in arb_keys(6), right in arb_keys(6)) {
        let spec = MergeSpec::horizontal(JoinMode::Full, vec![JoinMapping::same("id")])
            .with_allow_empty_result(true);
        let tables = [keyed_table("l", "v", &left), keyed_table("r", "v", &right)];
        let merged = merge(&spec, &tables).unwrap();
        for row in &merged.rows {
            prop_assert_eq!(row.len(), merged.width());
        }
    }
}
