//! XLSB error types

use thiserror::Error;

/// Result type for XLSB operations
pub type XlsbResult<T> = std::result::Result<T, XlsbError>;

/// Errors that can occur while reading an XLSB package
#[derive(Debug, Error)]
pub enum XlsbError {
    /// IO error, including record streams that end inside a record header
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error in a relationship part
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSB format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// No sheet with the given index
    #[error("Sheet index {0} out of range")]
    SheetNotFound(usize),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetdata_core::Error),
}
