//! Integration tests for vertical and horizontal merges.

use tabprep_merge::{merge, merge_with_report};
use tabprep_model::{
    ColumnRef, JoinMapping, JoinMode, MergeError, MergeSpec, MergeStrategy, StructuralMismatch,
    Table,
};

fn records(table: &Table) -> Vec<Vec<&str>> {
    table.records().collect()
}

fn people() -> Table {
    Table::from_records("people.csv", ["id", "name"], [["1", "A"], ["2", "B"]])
}

fn scores() -> Table {
    Table::from_records("scores.csv", ["id", "score"], [["2", "90"], ["3", "70"]])
}

#[test]
fn test_vertical_merge_counts_rows() {
    let a = Table::from_records("a.csv", ["id", "v"], [["1", "x"], ["2", "y"]]);
    let b = Table::from_records("b.csv", ["v", "id"], [["z", "3"]]);
    let c = Table::from_records("c.csv", ["id", "v"], [["4", "w"], ["5", "u"]]);

    let merged = merge(&MergeSpec::vertical(), &[a, b, c]).unwrap();

    assert_eq!(merged.len(), 5);
    assert_eq!(merged.headers, vec!["id", "v"]);
    assert_eq!(merged.rows[2].value("id"), "3");
    assert_eq!(merged.rows[2].value("v"), "z");
}

#[test]
fn test_vertical_header_mismatch_is_structural() {
    let a = Table::from_records("a.csv", ["A", "B"], [["1", "2"]]);
    let b = Table::from_records("b.csv", ["A", "C"], [["1", "2"]]);

    let err = merge(&MergeSpec::vertical(), &[a, b]).unwrap_err();

    assert_eq!(
        err.issues(),
        vec![&MergeError::StructuralMismatch(StructuralMismatch::HeaderSet {
            table: "b.csv".to_string(),
            missing: vec!["B".to_string()],
            extra: vec!["C".to_string()],
        })]
    );
    insta::assert_snapshot!(err.to_string(), @"merge validation failed with 1 issue(s): structural mismatch: header set of 'b.csv' differs from the first table (missing: [B], extra: [C])");
}

#[test]
fn test_full_join_scenario() {
    let spec = MergeSpec::horizontal(JoinMode::Full, vec![JoinMapping::same("id")]);
    let merged = merge(&spec, &[people(), scores()]).unwrap();

    assert_eq!(merged.headers, vec!["id", "name", "score"]);
    assert_eq!(
        records(&merged),
        vec![vec!["1", "A", ""], vec!["2", "B", "90"], vec!["3", "", "70"]]
    );
}

#[test]
fn test_collision_gets_suffix() {
    let left = Table::from_records("l.csv", ["id", "Value"], [["1", "left"]]);
    let right = Table::from_records("r.csv", ["id", "Value"], [["1", "right"]]);
    let spec = MergeSpec::horizontal(JoinMode::Inner, vec![JoinMapping::same("id")]);

    let merged = merge(&spec, &[left.clone(), right.clone()]).unwrap();
    assert_eq!(merged.headers, vec!["id", "Value", "Value_2"]);

    let custom = spec.with_suffix("_right");
    let merged = merge(&custom, &[left, right]).unwrap();
    assert_eq!(merged.headers, vec!["id", "Value", "Value_right"]);
    assert_eq!(merged.rows[0].value("Value_right"), "right");
}

#[test]
fn test_key_by_index() {
    let spec = MergeSpec::horizontal(
        JoinMode::Inner,
        vec![JoinMapping::same(ColumnRef::Index(0))],
    );
    let merged = merge(&spec, &[people(), scores()]).unwrap();
    assert_eq!(records(&merged), vec![vec!["2", "B", "90"]]);
}

#[test]
fn test_fold_over_four_tables() {
    let tables = [
        Table::from_records("1.csv", ["id", "v"], [["1", "a"], ["2", "b"]]),
        Table::from_records("2.csv", ["id", "v"], [["1", "c"]]),
        Table::from_records("3.csv", ["id", "w"], [["2", "d"]]),
        Table::from_records("4.csv", ["id", "v"], [["1", "e"], ["9", "f"]]),
    ];
    let spec = MergeSpec::horizontal(JoinMode::Full, vec![JoinMapping::same("id")]);

    let (merged, report) = merge_with_report(&spec, &tables).unwrap();

    assert_eq!(merged.headers, vec!["id", "v", "v_2", "w", "v_22"]);
    assert_eq!(
        records(&merged),
        vec![
            vec!["1", "a", "c", "", "e"],
            vec!["2", "b", "", "d", ""],
            vec!["9", "", "", "", "f"],
        ]
    );
    assert_eq!(report.strategy, MergeStrategy::Keyed);
    assert_eq!(report.join, Some(JoinMode::Full));
    assert_eq!(report.inputs.len(), 4);
    assert_eq!(report.output.rows, 3);
}

#[test]
fn test_right_join_keeps_right_keys() {
    let right = Table::from_records("r.csv", ["uid", "score"], [["3", "70"], ["2", "90"]]);
    let spec = MergeSpec::horizontal(JoinMode::Right, vec![JoinMapping::new("id", "uid")]);

    let merged = merge(&spec, &[people(), right]).unwrap();

    assert_eq!(merged.headers, vec!["id", "name", "score"]);
    assert_eq!(
        records(&merged),
        vec![vec!["2", "B", "90"], vec!["3", "", "70"]]
    );
}

#[test]
fn test_positional_merge() {
    let a = Table::from_records("a.csv", ["x"], [["1"], ["2"]]);
    let b = Table::from_records("b.csv", ["x"], [["3"], ["4"]]);
    let c = Table::from_records("c.csv", ["y"], [["5"], ["6"]]);

    let (merged, report) = merge_with_report(&MergeSpec::positional(), &[a, b, c]).unwrap();

    assert_eq!(merged.headers, vec!["x", "x_2", "y"]);
    assert_eq!(
        records(&merged),
        vec![vec!["1", "3", "5"], vec!["2", "4", "6"]]
    );
    assert_eq!(report.strategy, MergeStrategy::Positional);
    assert_eq!(report.join, None);
}

#[test]
fn test_validation_collects_all_issues() {
    let tables = [
        Table::from_records("a.csv", ["id"], [["1"]]),
        Table::from_records("b.csv", ["key"], [["1"]]),
        Table::from_records("c.csv", ["ref"], [["1"]]),
    ];
    let spec = MergeSpec::horizontal(JoinMode::Inner, vec![JoinMapping::same("id")]);

    let err = merge(&spec, &tables).unwrap_err();
    let issues = err.issues();

    assert_eq!(issues.len(), 2);
    let tables: Vec<&str> = issues
        .iter()
        .filter_map(|issue| match issue {
            MergeError::UnresolvedColumn { table, .. } => Some(table.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tables, vec!["b.csv", "c.csv"]);
}

#[test]
fn test_single_table_is_rejected() {
    let err = merge(&MergeSpec::vertical(), &[people()]).unwrap_err();
    assert!(matches!(err.issues()[0], MergeError::InvalidSpec(_)));
}

#[test]
fn test_empty_result_can_be_allowed() {
    let left = Table::from_records("l.csv", ["id"], [["1"]]);
    let right = Table::from_records("r.csv", ["id"], [["2"]]);
    let spec = MergeSpec::horizontal(JoinMode::Inner, vec![JoinMapping::same("id")]);

    let err = merge(&spec, &[left.clone(), right.clone()]).unwrap_err();
    assert!(matches!(err, MergeError::EmptyMergeResult { .. }));

    let merged = merge(&spec.with_allow_empty_result(true), &[left, right]).unwrap();
    assert!(merged.is_empty());
    assert_eq!(merged.headers, vec!["id"]);
}
