//! The receiving side of the import engine

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::cell::{CellAddress, CellRange, SharedString};
use crate::formula::TokenSequence;
use crate::model::{Biff2CellFormat, CellData, RowModel, TableData};
use crate::rich::RichString;

/// Key of a shared-formula definition
///
/// The XML format names groups by id; the binary formats identify a group by
/// the address of its anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SharedFormulaKey {
    Id(u32),
    Anchor(CellAddress),
}

/// Workbook shared-string table
#[derive(Debug, Clone, Default)]
pub struct SharedStrings(Arc<Vec<SharedString>>);

impl SharedStrings {
    pub fn new(strings: Vec<SharedString>) -> Self {
        Self(Arc::new(strings))
    }

    /// Look up a string by its (possibly negative) index
    pub fn get(&self, index: i32) -> Option<&SharedString> {
        usize::try_from(index).ok().and_then(|i| self.0.get(i))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for SharedStrings {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(SharedString::from).collect())
    }
}

/// Worksheet model receiving decoded rows, cells and formulas.
///
/// Each decoded cell results in exactly one `set_*_cell` call. Shared-formula
/// registration is register-once and the used area only ever grows; both are
/// the sink's responsibility.
pub trait SheetDataSink {
    fn set_row_model(&mut self, row: &RowModel);

    fn set_value_cell(&mut self, cell: &CellData, value: f64);

    fn set_boolean_cell(&mut self, cell: &CellData, value: bool);

    /// Error given as a binary error code
    fn set_error_code_cell(&mut self, cell: &CellData, code: u8);

    /// Error given as text (`#N/A`, or any text that failed to decode)
    fn set_error_cell(&mut self, cell: &CellData, text: &str);

    fn set_string_cell(&mut self, cell: &CellData, text: &str);

    /// Cell referencing the workbook shared-string table
    fn set_shared_string_cell(&mut self, cell: &CellData, index: i32);

    /// Finalized rich string
    fn set_rich_string_cell(&mut self, cell: &CellData, text: &RichString);

    fn set_date_time_cell(&mut self, cell: &CellData, value: NaiveDateTime);

    fn set_blank_cell(&mut self, cell: &CellData);

    fn set_formula_cell(&mut self, cell: &CellData, tokens: TokenSequence);

    /// Cell that is a member of shared-formula group `shared_id`
    fn set_shared_formula_cell(&mut self, cell: &CellData, shared_id: u32);

    fn create_shared_formula(&mut self, key: SharedFormulaKey, tokens: TokenSequence);

    fn create_array_formula(&mut self, range: CellRange, tokens: TokenSequence);

    fn create_table_operation(&mut self, range: CellRange, table: &TableData);

    fn extend_used_area(&mut self, addr: CellAddress);

    /// Inline formatting of a BIFF2 cell in a workbook without XF table
    fn set_inline_cell_format(&mut self, _cell: &CellData, _format: Biff2CellFormat) {}
}

impl<S: SheetDataSink + ?Sized> SheetDataSink for &mut S {
    fn set_row_model(&mut self, row: &RowModel) {
        (**self).set_row_model(row)
    }
    fn set_value_cell(&mut self, cell: &CellData, value: f64) {
        (**self).set_value_cell(cell, value)
    }
    fn set_boolean_cell(&mut self, cell: &CellData, value: bool) {
        (**self).set_boolean_cell(cell, value)
    }
    fn set_error_code_cell(&mut self, cell: &CellData, code: u8) {
        (**self).set_error_code_cell(cell, code)
    }
    fn set_error_cell(&mut self, cell: &CellData, text: &str) {
        (**self).set_error_cell(cell, text)
    }
    fn set_string_cell(&mut self, cell: &CellData, text: &str) {
        (**self).set_string_cell(cell, text)
    }
    fn set_shared_string_cell(&mut self, cell: &CellData, index: i32) {
        (**self).set_shared_string_cell(cell, index)
    }
    fn set_rich_string_cell(&mut self, cell: &CellData, text: &RichString) {
        (**self).set_rich_string_cell(cell, text)
    }
    fn set_date_time_cell(&mut self, cell: &CellData, value: NaiveDateTime) {
        (**self).set_date_time_cell(cell, value)
    }
    fn set_blank_cell(&mut self, cell: &CellData) {
        (**self).set_blank_cell(cell)
    }
    fn set_formula_cell(&mut self, cell: &CellData, tokens: TokenSequence) {
        (**self).set_formula_cell(cell, tokens)
    }
    fn set_shared_formula_cell(&mut self, cell: &CellData, shared_id: u32) {
        (**self).set_shared_formula_cell(cell, shared_id)
    }
    fn create_shared_formula(&mut self, key: SharedFormulaKey, tokens: TokenSequence) {
        (**self).create_shared_formula(key, tokens)
    }
    fn create_array_formula(&mut self, range: CellRange, tokens: TokenSequence) {
        (**self).create_array_formula(range, tokens)
    }
    fn create_table_operation(&mut self, range: CellRange, table: &TableData) {
        (**self).create_table_operation(range, table)
    }
    fn extend_used_area(&mut self, addr: CellAddress) {
        (**self).extend_used_area(addr)
    }
    fn set_inline_cell_format(&mut self, cell: &CellData, format: Biff2CellFormat) {
        (**self).set_inline_cell_format(cell, format)
    }
}
