//! End-to-end tests for sheetdata.
//!
//! Run with: `cargo test -p sheetdata --test e2e`

mod common;
mod reading;

pub use common::*;
