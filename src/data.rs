//! Dataset ingestion
//!
//! Comma-separated tabular text with a header row. Extra columns are kept;
//! nothing is validated here; the [`Preprocessor`](crate::preprocessing)
//! enforces the schema.

use crate::error::{CardioError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let file = File::open(path.as_ref())
        .map_err(|e| CardioError::DataError(format!("{}: {}", path.as_ref().display(), e)))?;

    csv_reader(file)
}

/// Parse CSV from an in-memory buffer (uploaded content, test fixtures).
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    csv_reader(Cursor::new(bytes.to_vec()))
}

fn csv_reader<R>(reader: R) -> Result<DataFrame>
where
    R: polars::io::mmap::MmapBytesReader,
{
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(reader)
        .finish()
        .map_err(|e| CardioError::DataError(e.to_string()))
}
