//! CSV file reading into [`Table`]s.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tabprep_model::{Row, Table};

use crate::error::{IngestError, Result};

/// Reads a CSV file into a table named after the file.
///
/// The first record is the header row. A UTF-8 BOM is stripped and header
/// names are trimmed. Records shorter than the header leave trailing fields
/// empty; fields beyond the header are dropped with a warning.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    read_table_from(file, table_name(path), path)
}

/// Reads CSV content from any reader; `path` is used in errors only.
pub fn read_table_from<R: Read>(reader: R, name: String, path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records();
    let header_record = match records.next() {
        Some(record) => record.map_err(|e| parse_error(path, &e))?,
        None => {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }
    };
    let headers = parse_headers(&header_record);
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::new(name, headers);
    let mut overlong = 0usize;
    for record in records {
        let record = record.map_err(|e| parse_error(path, &e))?;
        if record.len() > table.width() {
            overlong += 1;
        }
        let row = Row::from_pairs(table.headers.iter().cloned().zip(record.iter()));
        table.push_row(row);
    }
    table.finalize();

    if overlong > 0 {
        tracing::warn!(
            path = %path.display(),
            rows = overlong,
            "records with more fields than headers were truncated"
        );
    }
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.width(),
        "loaded CSV table"
    );
    Ok(table)
}

fn parse_headers(record: &StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let value = if idx == 0 {
                value.trim_start_matches('\u{feff}')
            } else {
                value
            };
            value.trim().to_string()
        })
        .collect()
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_error(path: &Path, err: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
