//! End-to-end tests for sheetdata-xlsx.
//!
//! Each test builds the package it needs in memory (ZIP + SpreadsheetML parts),
//! optionally saves it to a temp file, then reads it back with `XlsxReader`.

mod reading;

// Re-export common utilities for submodules
pub use common::*;
