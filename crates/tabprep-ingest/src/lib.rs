//! Table ingestion for tabprep.
//!
//! Loads CSV files into [`Table`](tabprep_model::Table)s and writes merged
//! tables back out. All values are kept as strings.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabprep_ingest::{read_table, write_table};
//!
//! let table = read_table(Path::new("data/visits.csv"))?;
//! write_table(Path::new("out/visits.csv"), &table)?;
//! ```

mod csv_table;
mod error;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use csv_table::{read_table, read_table_from, write_table, write_table_to};
