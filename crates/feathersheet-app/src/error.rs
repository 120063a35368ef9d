use feathersheet_core::TableError;
use feathersheet_io::IoError;
use thiserror::Error;

/// Errors surfaced to the user at the action boundary
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No document is open")]
    NoDocument,

    #[error("Document has no file name, use save-as")]
    NoPath,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Io(#[from] IoError),
}
