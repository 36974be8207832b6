//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::{read_table, read_table_from};
pub use writer::{write_table, write_table_to};
