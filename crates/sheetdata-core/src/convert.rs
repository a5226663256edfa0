//! Bounded address and range conversion

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};
use crate::legacy::BiffVersion;
use crate::{MAX_COLS, MAX_ROWS};

/// Converts textual and binary coordinates into addresses checked against the
/// limits of one sheet format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressConverter {
    max_rows: u32,
    max_cols: u16,
}

impl AddressConverter {
    /// Create a converter with explicit limits (row and column counts)
    pub const fn new(max_rows: u32, max_cols: u16) -> Self {
        Self { max_rows, max_cols }
    }

    /// Limits of the Office Open XML formats (`.xlsx`, `.xlsb`)
    pub const fn for_ooxml() -> Self {
        Self::new(MAX_ROWS, MAX_COLS)
    }

    /// Limits of a legacy BIFF version
    pub fn for_biff(version: BiffVersion) -> Self {
        let layout = version.layout();
        Self::new(layout.max_rows, layout.max_cols)
    }

    /// Highest valid 0-based row index
    pub fn max_row(&self) -> u32 {
        self.max_rows - 1
    }

    /// Highest valid 0-based column index
    pub fn max_col(&self) -> u16 {
        self.max_cols - 1
    }

    /// Parse an A1 reference and check it against the limits
    pub fn to_cell_address(&self, text: &str) -> Result<CellAddress> {
        let addr = CellAddress::parse(text)?;
        self.check(addr)
    }

    /// Check 0-based binary coordinates
    pub fn to_cell_address_at(&self, row: i64, col: i64) -> Result<CellAddress> {
        if row < 0 || row >= self.max_rows as i64 {
            return Err(Error::RowOutOfBounds(
                row.clamp(0, u32::MAX as i64) as u32,
                self.max_row(),
            ));
        }
        if col < 0 || col >= self.max_cols as i64 {
            return Err(Error::ColumnOutOfBounds(
                col.clamp(0, u32::MAX as i64) as u32,
                self.max_col(),
            ));
        }
        Ok(CellAddress::new(row as u32, col as u16))
    }

    /// Parse an `A1:B2` range (or single cell). Inverted ranges are rejected.
    pub fn to_cell_range(&self, text: &str) -> Result<CellRange> {
        let range = CellRange::parse(text)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", text, e)))?;
        self.check_range(range)
    }

    /// Check a range given as first/last row and first/last column
    pub fn to_cell_range_at(&self, first_row: i64, last_row: i64, first_col: i64, last_col: i64) -> Result<CellRange> {
        let start = self.to_cell_address_at(first_row, first_col)?;
        let end = self.to_cell_address_at(last_row, last_col)?;
        self.check_range(CellRange::new(start, end))
    }

    fn check(&self, addr: CellAddress) -> Result<CellAddress> {
        self.to_cell_address_at(addr.row as i64, addr.col as i64)
    }

    fn check_range(&self, range: CellRange) -> Result<CellRange> {
        self.check(range.start)?;
        self.check(range.end)?;
        if !range.is_ordered() {
            return Err(Error::InvalidRange(format!("{} is inverted", range)));
        }
        Ok(range)
    }
}

impl Default for AddressConverter {
    fn default() -> Self {
        Self::for_ooxml()
    }
}
