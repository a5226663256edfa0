//! # sheetdata-core
//!
//! Shared model and contracts of the sheetdata import engine.
//!
//! This crate provides the types every format decoder works against:
//! - [`RowModel`], [`CellData`], [`FormulaData`], [`TableData`] - the decoded model
//! - [`AddressConverter`] - bounded address and range conversion
//! - [`FormulaParser`] and [`StyleLookup`] - collaborators supplied by the host
//! - [`SheetDataSink`] - receives rows, cells and formulas
//! - [`SheetDataDecoder`] - the per-format dispatcher contract
//! - [`MemorySheet`] and [`RecordingSink`] - ready-made sinks
//!
//! ## Example
//!
//! ```rust
//! use sheetdata_core::{CellAddress, CellData, MemorySheet, SheetDataSink};
//!
//! let mut sheet = MemorySheet::new();
//! let cell = CellData::new(0, CellAddress::parse("B2").unwrap());
//! sheet.extend_used_area(cell.address);
//! sheet.set_value_cell(&cell, 42.0);
//!
//! assert_eq!(sheet.cell_count(), 1);
//! ```

pub mod attributes;
pub mod binary;
pub mod cell;
pub mod convert;
pub mod cursor;
pub mod decoder;
pub mod error;
pub mod formula;
pub mod import;
pub mod legacy;
pub mod memory;
pub mod model;
pub mod record;
pub mod rich;
pub mod sink;
pub mod styles;

// Re-exports for convenience
pub use attributes::AttributeList;
pub use cell::{parse_iso8601_datetime, CellAddress, CellError, CellRange, CellType, SharedString};
pub use convert::AddressConverter;
pub use cursor::CellCursor;
pub use decoder::{DecodedEvent, Fragment, SheetDataDecoder, SheetEnv};
pub use error::{Error, Result};
pub use formula::{
    FormulaContext, FormulaParser, FormulaSource, FormulaToken, TokenSequence,
    VerbatimFormulaParser,
};
pub use import::{ImportOptions, ImportedSheet, SheetInfo, SheetSelector};
pub use legacy::{BiffLayout, BiffVersion, StringShape, XfShape};
pub use memory::{CellContent, MemorySheet, SharedFormulaRegistry, StoredCell};
pub use model::{
    Biff2CellFormat, CellData, FormulaData, FormulaKind, RowModel, TableData, ValueRange,
};
pub use record::{RecordingSink, SinkCall};
pub use rich::{RichString, TextRun};
pub use sink::{SharedFormulaKey, SharedStrings, SheetDataSink};
pub use styles::{NoStyles, StyleLookup};

/// Maximum number of rows in a worksheet (Office Open XML limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Office Open XML limit)
pub const MAX_COLS: u16 = 16_384;
