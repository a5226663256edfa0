//! XLS error types

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur while reading an XLS file
#[derive(Debug, Error)]
pub enum XlsError {
    /// IO error, including errors of the compound file container
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("Invalid XLS format: {0}")]
    InvalidFormat(String),

    /// No sheet with the given index
    #[error("Sheet index {0} out of range")]
    SheetNotFound(usize),

    /// Core error, including unsupported BIFF versions
    #[error("Core error: {0}")]
    Core(#[from] sheetdata_core::Error),
}
