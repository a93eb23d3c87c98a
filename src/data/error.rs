use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a catalog file. Any of these aborts the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("line {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
