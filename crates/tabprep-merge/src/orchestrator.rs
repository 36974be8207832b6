//! Merge entry points: validate, pick a strategy, fold across inputs.

use tabprep_model::{
    AsOfSpec, JoinMode, MergeError, MergeMode, MergeReport, MergeSpec, MergeStrategy, Result, Table,
    TableSummary,
};
use tracing::{debug, info, info_span};

use crate::asof;
use crate::equality::{join_keyed, join_positional_with};
use crate::key::{JoinKey, Side};
use crate::naming::ColumnNamer;
use crate::validate::{validate_asof, validate_merge};
use crate::vertical;

/// Merges `tables` as described by `spec`.
///
/// Every structural problem is reported at once in a
/// [`MergeError::Validation`] before any rows are combined.
pub fn merge(spec: &MergeSpec, tables: &[Table]) -> Result<Table> {
    merge_with_report(spec, tables).map(|(table, _)| table)
}

/// Like [`merge`], also returning input and output counts.
pub fn merge_with_report(spec: &MergeSpec, tables: &[Table]) -> Result<(Table, MergeReport)> {
    let strategy = MergeStrategy::for_spec(spec);
    let span = info_span!(
        "merge",
        strategy = strategy.as_str(),
        join = %spec.join,
        tables = tables.len()
    );
    let _guard = span.enter();

    validate_merge(spec, tables)?;

    let merged = match strategy {
        MergeStrategy::Vertical => vertical::merge(tables)?,
        MergeStrategy::Positional => fold_positional(spec, tables)?,
        MergeStrategy::Keyed => fold_keyed(spec, tables)?,
        MergeStrategy::AsOf => {
            return Err(MergeError::InvalidSpec(
                "as-of merges are configured with an as-of spec".to_string(),
            ));
        }
    };

    let report = MergeReport {
        strategy,
        join: (spec.mode == MergeMode::Horizontal && !spec.keys.is_empty()).then_some(spec.join),
        inputs: tables.iter().map(TableSummary::from).collect(),
        output: TableSummary::from(&merged),
    };
    if !spec.allow_empty_result {
        check_not_empty(spec, &report)?;
    }
    info!(
        rows = merged.len(),
        columns = merged.width(),
        "merge complete"
    );
    Ok((merged, report))
}

/// As-of joins `right` onto `left`.
pub fn asof_merge(left: &Table, right: &Table, spec: &AsOfSpec) -> Result<Table> {
    asof_merge_with_report(left, right, spec).map(|(table, _)| table)
}

/// As-of merge over an input list, which must hold exactly two tables.
pub fn asof_merge_tables(spec: &AsOfSpec, tables: &[Table]) -> Result<(Table, MergeReport)> {
    match tables {
        [left, right] => asof_merge_with_report(left, right, spec),
        _ => {
            let refs: Vec<&Table> = tables.iter().collect();
            validate_asof(spec, &refs)?;
            Err(MergeError::InvalidSpec(format!(
                "an as-of merge needs exactly two tables, got {}",
                tables.len()
            )))
        }
    }
}

/// Like [`asof_merge`], also returning input and output counts.
pub fn asof_merge_with_report(
    left: &Table,
    right: &Table,
    spec: &AsOfSpec,
) -> Result<(Table, MergeReport)> {
    let span = info_span!(
        "asof_merge",
        left = %left.name,
        right = %right.name,
        direction = %spec.direction
    );
    let _guard = span.enter();

    validate_asof(spec, &[left, right])?;
    let merged = asof::join(left, right, spec)?;

    let report = MergeReport {
        strategy: MergeStrategy::AsOf,
        join: None,
        inputs: vec![TableSummary::from(left), TableSummary::from(right)],
        output: TableSummary::from(&merged),
    };
    info!(
        rows = merged.len(),
        columns = merged.width(),
        "as-of merge complete"
    );
    Ok((merged, report))
}

/// join(join(T1, T2), T3) ... with one namer shared by every step.
fn fold_keyed(spec: &MergeSpec, tables: &[Table]) -> Result<Table> {
    let (first, rest) = split_first(tables)?;
    let mut namer = ColumnNamer::new(&first.headers, &spec.suffix);
    let mut left_key = JoinKey::resolve(first, &spec.keys, Side::Left)?;
    // Later steps find the key under its output name.
    let renamed_key = JoinKey::from_columns(
        left_key
            .columns()
            .iter()
            .zip(&spec.keys)
            .map(|(column, mapping)| mapping.output.clone().unwrap_or_else(|| column.clone()))
            .collect(),
    );

    let mut acc: Option<Table> = None;
    for right in rest {
        let left = acc.as_ref().unwrap_or(first);
        debug!(left = %left.name, right = %right.name, rows = left.len(), "fold step");
        let joined = join_keyed(left, &left_key, right, &spec.keys, spec.join, &mut namer)?;
        left_key = renamed_key.clone();
        acc = Some(joined);
    }
    acc.ok_or_else(|| too_few_tables(tables.len()))
}

fn fold_positional(spec: &MergeSpec, tables: &[Table]) -> Result<Table> {
    let (first, rest) = split_first(tables)?;
    let mut namer = ColumnNamer::new(&first.headers, &spec.suffix);
    let mut acc: Option<Table> = None;
    for right in rest {
        let left = acc.as_ref().unwrap_or(first);
        debug!(left = %left.name, right = %right.name, "fold step");
        acc = Some(join_positional_with(left, right, &mut namer)?);
    }
    acc.ok_or_else(|| too_few_tables(tables.len()))
}

fn split_first(tables: &[Table]) -> Result<(&Table, &[Table])> {
    tables
        .split_first()
        .ok_or_else(|| too_few_tables(tables.len()))
}

fn too_few_tables(count: usize) -> MergeError {
    MergeError::InvalidSpec(format!("a merge needs at least two tables, got {count}"))
}

/// Fails when key matching eliminated rows the join mode would otherwise
/// keep. An empty result is fine when the side a mode keeps was empty.
fn check_not_empty(spec: &MergeSpec, report: &MergeReport) -> Result<()> {
    if report.output.rows > 0 {
        return Ok(());
    }
    let has_rows = |summary: &TableSummary| summary.rows > 0;
    let kept_rows = match report.join {
        Some(JoinMode::Inner) => report.inputs.iter().all(has_rows),
        Some(JoinMode::Left) => report.inputs.first().is_some_and(has_rows),
        // Each fold step keeps the newest right table's rows.
        Some(JoinMode::Right) => report.inputs.last().is_some_and(has_rows),
        Some(JoinMode::Full) | None => report.inputs.iter().any(has_rows),
    };
    if !kept_rows {
        return Ok(());
    }
    debug!(mode = %spec.join, "merge eliminated every row");
    let input_rows = report.input_rows();
    Err(MergeError::EmptyMergeResult {
        inputs: report.inputs.len(),
        input_rows,
    })
}
