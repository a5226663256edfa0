//! Error types for sheetdata-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding sheet data
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u16),

    /// Legacy BIFF version that has no layout table entry
    #[error("Unsupported BIFF version: record 0x{record_id:04X}, version 0x{version:04X}")]
    UnsupportedVersion { record_id: u16, version: u16 },

    /// A record body ended before a field could be read
    #[error("unexpected end of data at offset {offset}, need {needed} bytes")]
    Truncated { offset: usize, needed: usize },

    /// A UTF-16 string field could not be decoded
    #[error("invalid UTF-16 string: {0}")]
    InvalidUtf16(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error only concerns the record currently being decoded.
    ///
    /// Dispatchers log and skip such records instead of aborting the sheet.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. } | Error::InvalidUtf16(_) | Error::InvalidAddress(_)
        )
    }
}
