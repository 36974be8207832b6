//! CSV output.

use std::fs;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tabprep_model::Table;

use crate::error::{IngestError, Result};

/// Writes `table` as CSV: the header row, then each row in header order.
///
/// Missing parent directories are created.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(path, &e))?;
    }
    let file = fs::File::create(path).map_err(|e| write_error(path, &e))?;
    write_table_to(file, table, path)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.width(),
        "wrote CSV table"
    );
    Ok(())
}

/// Writes `table` as CSV into any writer; `path` is used in errors only.
pub fn write_table_to<W: Write>(writer: W, table: &Table, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer
        .write_record(&table.headers)
        .map_err(|e| write_error(path, &e))?;
    for record in table.records() {
        writer
            .write_record(&record)
            .map_err(|e| write_error(path, &e))?;
    }
    writer.flush().map_err(|e| write_error(path, &e))
}

fn write_error(path: &Path, err: &dyn std::error::Error) -> IngestError {
    IngestError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
