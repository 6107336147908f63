//! Tabular metadata reader
//!
//! Metadata sheets are delimited text files. The first row names the fields;
//! every following row is one [`MetadataRecord`] with cells trimmed and column
//! order preserved.

use crate::error::{IngestError, IngestResult};
use crate::models::MetadataRecord;
use std::path::Path;

/// Reader producing ordered records from a sheet
pub trait TabularReader: Send + Sync {
    /// Rows after the header row, keyed by header names
    fn read_records(&self, path: &Path) -> IngestResult<Vec<MetadataRecord>>;

    /// Every row as raw cells, without header interpretation
    fn read_rows(&self, path: &Path) -> IngestResult<Vec<Vec<String>>>;
}

/// Delimited-text reader (CSV by default)
#[derive(Debug, Clone)]
pub struct CsvTabularReader {
    delimiter: u8,
}

impl CsvTabularReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Pick the delimiter from a sheet extension (`tsv` → tab, otherwise comma)
    pub fn for_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("tsv") {
            Self { delimiter: b'\t' }
        } else {
            Self::new()
        }
    }

    fn builder(&self, has_headers: bool) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(has_headers)
            .flexible(true)
            .trim(csv::Trim::All);
        builder
    }
}

impl Default for CsvTabularReader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_error(path: &Path, err: csv::Error) -> IngestError {
    IngestError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

impl TabularReader for CsvTabularReader {
    fn read_records(&self, path: &Path) -> IngestResult<Vec<MetadataRecord>> {
        let mut reader = self
            .builder(true)
            .from_path(path)
            .map_err(|e| read_error(path, e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| read_error(path, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| read_error(path, e))?;
            records.push(MetadataRecord::from_pairs(
                headers.iter().cloned().zip(row.iter().map(str::to_string)),
            ));
        }

        tracing::debug!(path = %path.display(), records = records.len(), "Read metadata sheet");
        Ok(records)
    }

    fn read_rows(&self, path: &Path) -> IngestResult<Vec<Vec<String>>> {
        let mut reader = self
            .builder(false)
            .from_path(path)
            .map_err(|e| read_error(path, e))?;

        let mut rows = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| read_error(path, e))?;
            let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
            if index == 0 {
                if let Some(first) = cells.first_mut() {
                    *first = first.trim_start_matches('\u{feff}').to_string();
                }
            }
            rows.push(cells);
        }

        Ok(rows)
    }
}
