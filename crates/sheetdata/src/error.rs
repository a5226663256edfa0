//! Error types for format detection and workbook reading

use thiserror::Error;

/// Result type for sheetdata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or reading a workbook
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is none of the supported formats
    #[error("Unrecognized workbook format")]
    UnknownFormat,

    /// The format was recognized but its support is compiled out
    #[error("Support for {0} workbooks is not enabled")]
    Disabled(crate::Format),

    /// XLSX error
    #[cfg(feature = "xlsx")]
    #[error(transparent)]
    Xlsx(#[from] sheetdata_xlsx::XlsxError),

    /// XLSB error
    #[cfg(feature = "xlsb")]
    #[error(transparent)]
    Xlsb(#[from] sheetdata_xlsb::XlsbError),

    /// XLS error
    #[cfg(feature = "xls")]
    #[error(transparent)]
    Xls(#[from] sheetdata_xls::XlsError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetdata_core::Error),
}
