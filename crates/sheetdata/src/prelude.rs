//! Prelude module - common imports for sheetdata users
//!
//! ```rust
//! use sheetdata::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellContent,
    CellError,
    CellRange,
    // Decoding
    Decoder,
    Error,
    Format,
    ImportOptions,
    ImportedSheet,
    MemorySheet,
    RecordingSink,
    Result,
    RowModel,
    SheetDataSink,
    SheetInfo,
    // Main types
    Workbook,
};
