//! Event dataset and CSV loader
//!
//! Reads delimited text files (first row = field names) into an in-memory
//! sequence of [`EventRecord`]s. The loader performs no type coercion: every
//! cell stays a string until a query parses it.

use crate::types::{EventRecord, QueryError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An ordered, immutable sequence of event records loaded from one source
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Where the records came from (file name or caller-supplied label)
    source: String,
    /// Column names in file order
    headers: Vec<String>,
    /// Records in file order
    records: Vec<EventRecord>,
}

impl Dataset {
    /// Load a comma-separated file with default loader settings
    pub fn from_path(path: &Path) -> Result<Self> {
        DatasetLoader::new().load_path(path)
    }

    /// Load comma-separated data from any reader with default loader settings
    pub fn from_reader<R: Read>(reader: R, source: impl Into<String>) -> Result<Self> {
        DatasetLoader::new().load_reader(reader, source)
    }

    /// Name of the source this dataset was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All records in source order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that the header row carries every named column
    pub fn require_fields(&self, fields: &[&str]) -> Result<()> {
        for field in fields {
            if !self.headers.iter().any(|h| h == field) {
                return Err(QueryError::MissingField(field.to_string()));
            }
        }
        Ok(())
    }

    /// Get dataset statistics
    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            num_records: self.records.len(),
            num_fields: self.headers.len(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Dataset statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DatasetStats {
    /// Number of event records
    pub num_records: usize,
    /// Number of columns
    pub num_fields: usize,
}

/// CSV loader settings
#[derive(Debug, Clone, Copy)]
pub struct DatasetLoader {
    delimiter: u8,
    trim: bool,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
        }
    }
}

impl DatasetLoader {
    /// Create a loader with default settings (comma, no trimming)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder method: trim whitespace around headers and cells
    pub fn with_trim(mut self, enabled: bool) -> Self {
        self.trim = enabled;
        self
    }

    /// Load a dataset from a file on disk
    pub fn load_path(&self, path: &Path) -> Result<Dataset> {
        log::info!("Loading event data: {:?}", path);

        let file = File::open(path).map_err(|e| {
            QueryError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to open {:?}: {}", path, e),
            ))
        })?;

        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();

        self.load_reader(file, source)
    }

    /// Load a dataset from any reader
    ///
    /// Rows with a different number of cells than the header row are
    /// rejected with a CSV error.
    pub fn load_reader<R: Read>(&self, reader: R, source: impl Into<String>) -> Result<Dataset> {
        let source = source.into();

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None })
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();
        log::debug!("{}: {} columns: {:?}", source, headers.len(), headers);

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let record: EventRecord = headers
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect();
            records.push(record);
        }

        log::info!("Loaded {} records from {}", records.len(), source);

        Ok(Dataset {
            source,
            headers,
            records,
        })
    }
}
