use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabprep_model::{MergeError, TableSummary};

use crate::commands::MergeOutcome;

pub fn print_summary(outcome: &MergeOutcome) {
    let report = &outcome.report;
    match report.join {
        Some(join) => println!("Strategy: {} ({join} join)", report.strategy.as_str()),
        None => println!("Strategy: {}", report.strategy.as_str()),
    }
    println!("Output: {}", outcome.output.display());
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }
    println!("{}", summary_table(&report.inputs, &report.output));
}

/// Input rows followed by a bold output row.
pub fn summary_table(inputs: &[TableSummary], output: &TableSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for input in inputs {
        table.add_row(vec![
            Cell::new(&input.name),
            Cell::new(input.rows),
            Cell::new(input.columns),
        ]);
    }
    table.add_row(vec![
        Cell::new("OUTPUT")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(output.rows).add_attribute(Attribute::Bold),
        Cell::new(output.columns).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Prints a merge failure, one line per validation issue.
pub fn print_error(error: &anyhow::Error) {
    eprintln!("error: {error:#}");
    let issues = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<MergeError>())
        .map(MergeError::issues)
        .unwrap_or_default();
    if issues.len() > 1 {
        for issue in issues {
            eprintln!("  - {issue}");
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
