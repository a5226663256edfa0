//! A sink that records every call it receives

use chrono::NaiveDateTime;

use crate::cell::{CellAddress, CellRange};
use crate::formula::TokenSequence;
use crate::model::{Biff2CellFormat, CellData, RowModel, TableData};
use crate::rich::RichString;
use crate::sink::{SharedFormulaKey, SheetDataSink};

/// One recorded sink call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SinkCall {
    RowModel(RowModel),
    Value(CellData, f64),
    Boolean(CellData, bool),
    ErrorCode(CellData, u8),
    ErrorText(CellData, String),
    String(CellData, String),
    SharedString(CellData, i32),
    RichString(CellData, RichString),
    DateTime(CellData, NaiveDateTime),
    Blank(CellData),
    Formula(CellData, TokenSequence),
    SharedFormulaRef(CellData, u32),
    CreateSharedFormula(SharedFormulaKey, TokenSequence),
    CreateArrayFormula(CellRange, TokenSequence),
    CreateTableOperation(CellRange, TableData),
    ExtendUsedArea(CellAddress),
    InlineFormat(CellData, Biff2CellFormat),
}

impl SinkCall {
    /// The cell a cell-setter call targets
    pub fn cell(&self) -> Option<&CellData> {
        match self {
            SinkCall::Value(c, _)
            | SinkCall::Boolean(c, _)
            | SinkCall::ErrorCode(c, _)
            | SinkCall::ErrorText(c, _)
            | SinkCall::String(c, _)
            | SinkCall::SharedString(c, _)
            | SinkCall::RichString(c, _)
            | SinkCall::DateTime(c, _)
            | SinkCall::Blank(c)
            | SinkCall::Formula(c, _)
            | SinkCall::SharedFormulaRef(c, _) => Some(c),
            _ => None,
        }
    }

    /// Whether this call stores a literal value (not blank, not a formula)
    pub fn is_literal_value(&self) -> bool {
        matches!(
            self,
            SinkCall::Value(..)
                | SinkCall::Boolean(..)
                | SinkCall::ErrorCode(..)
                | SinkCall::ErrorText(..)
                | SinkCall::String(..)
                | SinkCall::SharedString(..)
                | SinkCall::RichString(..)
                | SinkCall::DateTime(..)
        )
    }
}

/// Sink that keeps the full call stream, in order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls that set a cell, skipping row models and registrations
    pub fn cell_calls(&self) -> impl Iterator<Item = &SinkCall> {
        self.calls.iter().filter(|c| c.cell().is_some())
    }
}

impl SheetDataSink for RecordingSink {
    fn set_row_model(&mut self, row: &RowModel) {
        self.calls.push(SinkCall::RowModel(row.clone()));
    }
    fn set_value_cell(&mut self, cell: &CellData, value: f64) {
        self.calls.push(SinkCall::Value(*cell, value));
    }
    fn set_boolean_cell(&mut self, cell: &CellData, value: bool) {
        self.calls.push(SinkCall::Boolean(*cell, value));
    }
    fn set_error_code_cell(&mut self, cell: &CellData, code: u8) {
        self.calls.push(SinkCall::ErrorCode(*cell, code));
    }
    fn set_error_cell(&mut self, cell: &CellData, text: &str) {
        self.calls.push(SinkCall::ErrorText(*cell, text.to_string()));
    }
    fn set_string_cell(&mut self, cell: &CellData, text: &str) {
        self.calls.push(SinkCall::String(*cell, text.to_string()));
    }
    fn set_shared_string_cell(&mut self, cell: &CellData, index: i32) {
        self.calls.push(SinkCall::SharedString(*cell, index));
    }
    fn set_rich_string_cell(&mut self, cell: &CellData, text: &RichString) {
        self.calls.push(SinkCall::RichString(*cell, text.clone()));
    }
    fn set_date_time_cell(&mut self, cell: &CellData, value: NaiveDateTime) {
        self.calls.push(SinkCall::DateTime(*cell, value));
    }
    fn set_blank_cell(&mut self, cell: &CellData) {
        self.calls.push(SinkCall::Blank(*cell));
    }
    fn set_formula_cell(&mut self, cell: &CellData, tokens: TokenSequence) {
        self.calls.push(SinkCall::Formula(*cell, tokens));
    }
    fn set_shared_formula_cell(&mut self, cell: &CellData, shared_id: u32) {
        self.calls.push(SinkCall::SharedFormulaRef(*cell, shared_id));
    }
    fn create_shared_formula(&mut self, key: SharedFormulaKey, tokens: TokenSequence) {
        self.calls.push(SinkCall::CreateSharedFormula(key, tokens));
    }
    fn create_array_formula(&mut self, range: CellRange, tokens: TokenSequence) {
        self.calls.push(SinkCall::CreateArrayFormula(range, tokens));
    }
    fn create_table_operation(&mut self, range: CellRange, table: &TableData) {
        self.calls
            .push(SinkCall::CreateTableOperation(range, table.clone()));
    }
    fn extend_used_area(&mut self, addr: CellAddress) {
        self.calls.push(SinkCall::ExtendUsedArea(addr));
    }
    fn set_inline_cell_format(&mut self, cell: &CellData, format: Biff2CellFormat) {
        self.calls.push(SinkCall::InlineFormat(*cell, format));
    }
}
