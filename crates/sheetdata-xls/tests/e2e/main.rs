//! End-to-end tests for sheetdata-xls.
//!
//! Each test assembles a BIFF record stream in memory, wraps it in a
//! compound file where the version calls for one, then reads it back with
//! `XlsReader`.

mod common;
mod reading;

pub use common::*;
