//! Row union of tables sharing one header set.

use tabprep_model::{MergeError, Result, StructuralMismatch, Table};
use tracing::debug;

/// Concatenates the rows of `tables` in input order.
///
/// The output keeps the first table's header order. Duplicate rows are kept.
pub fn merge(tables: &[Table]) -> Result<Table> {
    let Some(first) = tables.first() else {
        return Err(MergeError::InvalidSpec(
            "vertical merge needs at least one table".to_string(),
        ));
    };
    for table in &tables[1..] {
        if let Some(mismatch) = header_set_mismatch(first, table) {
            return Err(mismatch.into());
        }
    }

    let total: usize = tables.iter().map(Table::len).sum();
    let mut merged = Table::new(first.name.clone(), first.headers.clone());
    merged.rows.reserve(total);
    for table in tables {
        debug!(table = %table.name, rows = table.len(), "appending rows");
        merged.rows.extend(table.rows.iter().cloned());
    }
    merged.finalize();
    Ok(merged)
}

/// Compares `table`'s header set with `first`'s, ignoring order.
pub fn header_set_mismatch(first: &Table, table: &Table) -> Option<StructuralMismatch> {
    let expected = first.header_set();
    let actual = table.header_set();
    if expected == actual {
        return None;
    }
    Some(StructuralMismatch::HeaderSet {
        table: table.name.clone(),
        missing: names(expected.difference(&actual)),
        extra: names(actual.difference(&expected)),
    })
}

fn names<'a, 'b: 'a>(values: impl Iterator<Item = &'a &'b str>) -> Vec<String> {
    values.map(|value| (*value).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_in_order() {
        let a = Table::from_records("a", ["id", "v"], [["1", "x"], ["2", "y"]]);
        let b = Table::from_records("b", ["v", "id"], [["z", "3"]]);
        let merged = merge(&[a, b]).unwrap();

        assert_eq!(merged.headers, vec!["id", "v"]);
        let records: Vec<Vec<&str>> = merged.records().collect();
        assert_eq!(records, vec![vec!["1", "x"], vec!["2", "y"], vec!["3", "z"]]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let a = Table::from_records("a", ["id"], [["1"]]);
        let merged = merge(&[a.clone(), a]).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_header_mismatch_names_missing_and_extra() {
        let a = Table::from_records("a.csv", ["A", "B"], [["1", "2"]]);
        let b = Table::from_records("b.csv", ["A", "C"], [["1", "2"]]);
        let err = merge(&[a, b]).unwrap_err();
        assert_eq!(
            err,
            MergeError::StructuralMismatch(StructuralMismatch::HeaderSet {
                table: "b.csv".to_string(),
                missing: vec!["B".to_string()],
                extra: vec!["C".to_string()],
            })
        );
    }

    #[test]
    fn test_no_tables() {
        assert!(matches!(merge(&[]), Err(MergeError::InvalidSpec(_))));
    }
}
