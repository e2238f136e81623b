use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a sales dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data source not found: {}", .0.display())]
    DataUnavailable(PathBuf),
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// `row` is the 1-based data row, header excluded.
    #[error("row {row}, column \"{column}\": cannot parse {value:?} as {expected}")]
    DataFormat {
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("missing required column \"{0}\"")]
    MissingColumn(&'static str),
    #[error("unexpected layout: {0}")]
    Layout(String),
    #[error("dataset contains no records")]
    Empty,
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl DataError {
    pub(crate) fn format(
        row: usize,
        column: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        DataError::DataFormat {
            row,
            column,
            value: value.into(),
            expected,
        }
    }
}
