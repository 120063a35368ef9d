use std::path::PathBuf;

use arrow::error::ArrowError;
use feathersheet_core::TableError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

/// Failures reading or writing a document file
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The file decoded but does not form a valid table
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Io {
            path: path.into(),
            source,
        }
    }
}
