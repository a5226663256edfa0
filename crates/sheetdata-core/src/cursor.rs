//! Implicit row/column tracking

use crate::cell::CellAddress;

/// Position of the most recently decoded row and cell of a worksheet.
///
/// Rows and cells without an explicit address continue from here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCursor {
    row: Option<u32>,
    col: Option<u16>,
}

impl CellCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything (new worksheet)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Enter a row; the column position goes back to "before column 0"
    pub fn begin_row(&mut self, row: u32) {
        self.row = Some(row);
        self.col = None;
    }

    /// 0-based index of the row following the current one
    pub fn next_row(&self) -> i64 {
        self.row.map_or(0, |r| r as i64 + 1)
    }

    /// 0-based index of the row cells are currently placed in
    pub fn current_row(&self) -> u32 {
        self.row.unwrap_or(0)
    }

    /// 0-based column following the last resolved cell of this row
    pub fn next_col(&self) -> i64 {
        self.col.map_or(0, |c| c as i64 + 1)
    }

    /// Record a successfully resolved cell
    pub fn set_cell(&mut self, addr: CellAddress) {
        self.row = Some(addr.row);
        self.col = Some(addr.col);
    }
}
