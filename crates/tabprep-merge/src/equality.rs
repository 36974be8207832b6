//! Equality-keyed and positional horizontal joins.

use std::collections::HashSet;

use tabprep_model::{JoinMapping, JoinMode, MergeError, Result, Row, StructuralMismatch, Table};
use tracing::debug;

use crate::index::TableIndex;
use crate::key::{JoinKey, Side};
use crate::naming::ColumnNamer;

/// Joins `right` onto `left` on the key columns named by `mappings`.
///
/// Output headers are the left headers (key columns renamed to their mapping's
/// output name) followed by the right non-key headers, renamed with `suffix`
/// when they collide. Rows follow left order, each left row expanded over its
/// matching right rows in right order; unmatched right rows come last.
pub fn join(
    left: &Table,
    right: &Table,
    mappings: &[JoinMapping],
    mode: JoinMode,
    suffix: &str,
) -> Result<Table> {
    let left_key = JoinKey::resolve(left, mappings, Side::Left)?;
    let mut namer = ColumnNamer::new(&left.headers, suffix);
    join_keyed(left, &left_key, right, mappings, mode, &mut namer)
}

/// Joins with left key columns already resolved to header names.
///
/// `namer` must hold the left table's headers and receives every output name
/// this step claims.
pub(crate) fn join_keyed(
    left: &Table,
    left_key: &JoinKey,
    right: &Table,
    mappings: &[JoinMapping],
    mode: JoinMode,
    namer: &mut ColumnNamer,
) -> Result<Table> {
    let right_key = JoinKey::resolve(right, mappings, Side::Right)?;
    let key_outputs = key_output_columns(left, left_key, mappings)?;

    let mut headers = left.headers.clone();
    for (left_column, output) in left_key.columns().iter().zip(&key_outputs) {
        if left_column != output {
            if let Some(header) = headers.iter_mut().find(|header| *header == left_column) {
                header.clone_from(output);
            }
            namer.rename(left_column, output);
        }
    }
    let right_columns = claim_right_columns(right, |column| right_key.contains(column), namer);
    headers.extend(right_columns.iter().map(|(_, output)| output.clone()));

    let index = TableIndex::build(&right.rows, |row| right_key.value(row));
    let mut matched: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(left.len().max(right.len()));

    for left_row in &left.rows {
        let key = left_key.value(left_row);
        let partners = index.get(&key);
        if partners.is_empty() {
            if mode.keeps_unmatched_left() {
                rows.push(project_left(left_row, left_key, &key_outputs));
            }
            continue;
        }
        for &pos in partners {
            let mut row = project_left(left_row, left_key, &key_outputs);
            copy_right(&mut row, &right.rows[pos], &right_columns);
            rows.push(row);
        }
        matched.insert(key);
    }

    let left_rows_emitted = rows.len();
    if mode.keeps_unmatched_right() {
        for right_row in &right.rows {
            if matched.contains(&right_key.value(right_row)) {
                continue;
            }
            let mut row = Row::new();
            for (right_column, output) in right_key.columns().iter().zip(&key_outputs) {
                row.insert(output.clone(), right_row.value(right_column));
            }
            copy_right(&mut row, right_row, &right_columns);
            rows.push(row);
        }
    }

    debug!(
        left = %left.name,
        right = %right.name,
        mode = %mode,
        left_rows = left_rows_emitted,
        right_only_rows = rows.len() - left_rows_emitted,
        "equality join"
    );

    let mut joined = Table::new(left.name.clone(), headers).with_rows(rows);
    joined.finalize();
    Ok(joined)
}

/// Merges row i of `right` into row i of `left`.
pub fn join_positional(left: &Table, right: &Table, suffix: &str) -> Result<Table> {
    let mut namer = ColumnNamer::new(&left.headers, suffix);
    join_positional_with(left, right, &mut namer)
}

pub(crate) fn join_positional_with(
    left: &Table,
    right: &Table,
    namer: &mut ColumnNamer,
) -> Result<Table> {
    if left.len() != right.len() {
        return Err(StructuralMismatch::RowCount {
            table: right.name.clone(),
            expected: left.len(),
            actual: right.len(),
        }
        .into());
    }

    let right_columns = claim_right_columns(right, |_| false, namer);
    let mut headers = left.headers.clone();
    headers.extend(right_columns.iter().map(|(_, output)| output.clone()));

    let rows = left
        .rows
        .iter()
        .zip(&right.rows)
        .map(|(left_row, right_row)| {
            let mut row = left_row.clone();
            copy_right(&mut row, right_row, &right_columns);
            row
        })
        .collect();

    debug!(left = %left.name, right = %right.name, rows = left.len(), "positional join");

    let mut joined = Table::new(left.name.clone(), headers).with_rows(rows);
    joined.finalize();
    Ok(joined)
}

/// Output header of each key column: the mapping's output name or the left name.
fn key_output_columns(
    left: &Table,
    left_key: &JoinKey,
    mappings: &[JoinMapping],
) -> Result<Vec<String>> {
    left_key
        .columns()
        .iter()
        .zip(mappings)
        .map(|(left_column, mapping)| match &mapping.output {
            Some(output) if output != left_column && left.has_column(output) => {
                Err(MergeError::InvalidSpec(format!(
                    "output name '{output}' for key '{left_column}' collides with an existing column of '{}'",
                    left.name
                )))
            }
            Some(output) => Ok(output.clone()),
            None => Ok(left_column.clone()),
        })
        .collect()
}

/// Claims an output name for every right header not excluded, in header order.
pub(crate) fn claim_right_columns(
    right: &Table,
    excluded: impl Fn(&str) -> bool,
    namer: &mut ColumnNamer,
) -> Vec<(String, String)> {
    right
        .headers
        .iter()
        .filter(|header| !excluded(header.as_str()))
        .map(|header| (header.clone(), namer.claim(header)))
        .collect()
}

pub(crate) fn copy_right(row: &mut Row, right_row: &Row, columns: &[(String, String)]) {
    for (source, output) in columns {
        row.insert(output.clone(), right_row.value(source));
    }
}

fn project_left(left_row: &Row, left_key: &JoinKey, key_outputs: &[String]) -> Row {
    let mut row = left_row.clone();
    for (left_column, output) in left_key.columns().iter().zip(key_outputs) {
        if left_column != output {
            let value = row.remove(left_column).unwrap_or_default();
            row.insert(output.clone(), value);
        }
    }
    row
}
