//! End-to-end tests for sheetdata-xlsb.
//!
//! Each test assembles the BIFF12 parts it needs in memory, zips them into a
//! package, then reads it back with `XlsbReader`.

mod common;
mod reading;

pub use common::*;
