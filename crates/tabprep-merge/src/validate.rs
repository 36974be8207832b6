//! Structural validation run before any join.
//!
//! Checks run in stages and every issue of a stage is collected:
//!
//! 1. configuration: table count, tolerance, output-name uniqueness
//! 2. structure: duplicate headers per table, positional row counts
//! 3. headers: vertical header sets, key and time column resolution,
//!    output-name collisions
//!
//! A stage runs only when the stages before it found nothing, since header
//! checks are meaningless on tables whose structure is already broken.

use std::collections::BTreeSet;

use tabprep_model::{
    AsOfSpec, JoinMapping, MergeError, MergeMode, MergeSpec, Result, StructuralMismatch, Table,
};
use tracing::debug;

use crate::vertical::header_set_mismatch;

/// Validates a vertical or horizontal merge of `tables`.
pub fn validate_merge(spec: &MergeSpec, tables: &[Table]) -> Result<()> {
    let mut issues = Vec::new();
    if tables.len() < 2 {
        issues.push(MergeError::InvalidSpec(format!(
            "a merge needs at least two tables, got {}",
            tables.len()
        )));
    }
    if spec.mode == MergeMode::Horizontal {
        check_output_names(&spec.keys, &mut issues);
    }
    if !issues.is_empty() {
        return finish(issues);
    }

    for table in tables {
        check_duplicate_headers(table, &mut issues);
    }
    if spec.is_positional() {
        let expected = tables[0].len();
        for table in &tables[1..] {
            if table.len() != expected {
                issues.push(
                    StructuralMismatch::RowCount {
                        table: table.name.clone(),
                        expected,
                        actual: table.len(),
                    }
                    .into(),
                );
            }
        }
    }
    if !issues.is_empty() {
        return finish(issues);
    }

    match spec.mode {
        MergeMode::Vertical => {
            for table in &tables[1..] {
                if let Some(mismatch) = header_set_mismatch(&tables[0], table) {
                    issues.push(mismatch.into());
                }
            }
        }
        MergeMode::Horizontal => check_key_columns(&spec.keys, tables, &mut issues),
    }
    finish(issues)
}

/// Validates an as-of merge of `tables`, which must be exactly two.
pub fn validate_asof(spec: &AsOfSpec, tables: &[&Table]) -> Result<()> {
    let mut issues = Vec::new();
    if tables.len() != 2 {
        issues.push(MergeError::InvalidSpec(format!(
            "an as-of merge needs exactly two tables, got {}",
            tables.len()
        )));
    }
    if let Some(seconds) = spec.tolerance_seconds {
        if !seconds.is_finite() || seconds < 0.0 {
            issues.push(MergeError::InvalidSpec(format!(
                "tolerance must be a finite, non-negative number of seconds, got {seconds}"
            )));
        }
    }
    if !issues.is_empty() {
        return finish(issues);
    }

    for table in tables {
        check_duplicate_headers(table, &mut issues);
    }
    if !issues.is_empty() {
        return finish(issues);
    }

    let (left, right) = (tables[0], tables[1]);
    if let Err(err) = spec.left_time.resolve(&left.name, &left.headers) {
        issues.push(err);
    }
    if let Err(err) = spec.right_time.resolve(&right.name, &right.headers) {
        issues.push(err);
    }
    for mapping in &spec.by {
        if let Err(err) = mapping.left.resolve(&left.name, &left.headers) {
            issues.push(err);
        }
        if let Err(err) = mapping.right.resolve(&right.name, &right.headers) {
            issues.push(err);
        }
    }
    finish(issues)
}

fn finish(issues: Vec<MergeError>) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    debug!(count = issues.len(), "merge validation failed");
    Err(MergeError::Validation { issues })
}

fn check_duplicate_headers(table: &Table, issues: &mut Vec<MergeError>) {
    let duplicates = table.duplicate_headers();
    if !duplicates.is_empty() {
        issues.push(
            StructuralMismatch::DuplicateHeaders {
                table: table.name.clone(),
                duplicates,
            }
            .into(),
        );
    }
}

fn check_output_names(mappings: &[JoinMapping], issues: &mut Vec<MergeError>) {
    let mut seen = BTreeSet::new();
    for output in mappings.iter().filter_map(|mapping| mapping.output.as_deref()) {
        if output.is_empty() {
            issues.push(MergeError::InvalidSpec(
                "key output names must not be empty".to_string(),
            ));
        } else if !seen.insert(output) {
            issues.push(MergeError::InvalidSpec(format!(
                "key output name '{output}' is used by more than one mapping"
            )));
        }
    }
}

/// Left references resolve against the first table, right references against
/// every later table.
fn check_key_columns(mappings: &[JoinMapping], tables: &[Table], issues: &mut Vec<MergeError>) {
    let first = &tables[0];
    for mapping in mappings {
        match mapping.left.resolve(&first.name, &first.headers) {
            Ok(left_column) => {
                if let Some(output) = &mapping.output {
                    if output != left_column && first.has_column(output) {
                        issues.push(MergeError::InvalidSpec(format!(
                            "output name '{output}' for key '{left_column}' collides with an existing column of '{}'",
                            first.name
                        )));
                    }
                }
            }
            Err(err) => issues.push(err),
        }
        for table in &tables[1..] {
            if let Err(err) = mapping.right.resolve(&table.name, &table.headers) {
                issues.push(err);
            }
        }
    }
}
