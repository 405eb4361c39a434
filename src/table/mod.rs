//! @acp:module "Parameter Table"
//! @acp:summary "Load CSV data files into column-oriented parameter tables"
//! @acp:domain cli
//! @acp:layer io
//!
//! Each data file describes one hardware/version variant. The first row names
//! the columns, every following row holds one value per column. Values stay as
//! the text found in the file (trimmed) so numbers render exactly as written.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};

/// @acp:summary "Column name to ordered values, loaded from one data file"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTable {
    source: PathBuf,
    headers: Vec<String>,
    columns: HashMap<String, Vec<String>>,
    rows: usize,
}

impl ParameterTable {
    /// @acp:summary "Load a table from a CSV file on disk"
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_reader(path, file)
    }

    /// Parse CSV from any reader; `source` names the table in errors and
    /// provides the version suffix.
    pub fn from_reader<R: Read>(source: impl Into<PathBuf>, reader: R) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(PackError::data_format(&source, Some(1), "missing header row"));
        }

        let mut columns: HashMap<String, Vec<String>> = HashMap::with_capacity(headers.len());
        for header in &headers {
            if columns.insert(header.clone(), Vec::new()).is_some() {
                return Err(PackError::data_format(
                    &source,
                    Some(1),
                    format!("duplicate column '{}'", header),
                ));
            }
        }

        let mut rows = 0;
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            if record.len() != headers.len() {
                return Err(PackError::data_format(
                    &source,
                    record.position().map(|p| p.line()),
                    format!("expected {} fields, found {}", headers.len(), record.len()),
                ));
            }

            for (header, value) in headers.iter().zip(record.iter()) {
                if let Some(values) = columns.get_mut(header) {
                    values.push(value.to_string());
                }
            }
            rows += 1;
        }

        tracing::debug!(
            source = %source.display(),
            columns = headers.len(),
            rows,
            "Loaded parameter table"
        );

        Ok(Self {
            source,
            headers,
            columns,
            rows,
        })
    }

    /// Base name of the data file without its extension
    pub fn version_suffix(&self) -> String {
        version_suffix(&self.source)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of non-blank data rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// @acp:summary "Values of a column joined by `separator`"
    pub fn joined(&self, name: &str, separator: &str) -> Result<String> {
        self.column(name)
            .map(|values| values.join(separator))
            .ok_or_else(|| {
                PackError::data_format(&self.source, None, format!("missing column '{}'", name))
            })
    }
}

/// File stem of a data file path, used as the package version suffix
pub fn version_suffix(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
