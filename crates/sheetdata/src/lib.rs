//! # sheetdata
//!
//! Imports the row and cell data of spreadsheet worksheets.
//!
//! ## Features
//!
//! - XLSX worksheets (`sheetData` element of SpreadsheetML), feature `xlsx`
//! - XLSB worksheets (BIFF12 records), feature `xlsb`
//! - XLS worksheets (BIFF2 to BIFF8 records), feature `xls`
//! - Pluggable sinks and formula parsers
//!
//! ## Example
//!
//! ```no_run
//! use sheetdata::prelude::*;
//!
//! for sheet in sheetdata::open("book.xlsb")? {
//!     println!("{}: {:?}", sheet.info.name, sheet.data.used_area());
//! }
//!
//! let options = ImportOptions::new().sheet_name("Data");
//! for sheet in sheetdata::open_with("book.xls", &options)? {
//!     println!("{} cells", sheet.data.cell_count());
//! }
//! # Ok::<(), sheetdata::Error>(())
//! ```

#[cfg(not(any(feature = "xlsx", feature = "xlsb", feature = "xls")))]
compile_error!("enable at least one of the `xlsx`, `xlsb` or `xls` features");

pub mod decoder;
pub mod error;
pub mod format;
pub mod prelude;
pub mod workbook;

pub use decoder::Decoder;
pub use error::{Error, Result};
pub use format::Format;
pub use workbook::Workbook;

// Re-export core types
pub use sheetdata_core::{
    AddressConverter, CellAddress, CellContent, CellData, CellError, CellRange, CellType,
    DecodedEvent, FormulaParser, Fragment, ImportOptions, ImportedSheet, MemorySheet,
    RecordingSink, RichString, RowModel, SheetDataDecoder, SheetDataSink, SheetEnv, SheetInfo,
    SinkCall, StoredCell, TokenSequence, VerbatimFormulaParser,
};

use std::path::Path;

/// Decode every worksheet of the workbook at `path` into memory
pub fn open<P: AsRef<Path>>(path: P) -> Result<Vec<ImportedSheet<MemorySheet>>> {
    Workbook::open_file(path)?.read_all()
}

/// Decode the worksheets of the workbook at `path` that `options` selects
pub fn open_with<P: AsRef<Path>>(
    path: P,
    options: &ImportOptions,
) -> Result<Vec<ImportedSheet<MemorySheet>>> {
    Workbook::open_file(path)?.read_with(options)
}
