//! In-memory worksheet store

use std::collections::BTreeMap;

use ahash::AHashMap;
use chrono::NaiveDateTime;

use crate::cell::{CellAddress, CellError, CellRange, SharedString};
use crate::formula::TokenSequence;
use crate::model::{Biff2CellFormat, CellData, RowModel, TableData};
use crate::rich::RichString;
use crate::sink::{SharedFormulaKey, SharedStrings, SheetDataSink};

/// Content of a stored cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CellContent {
    Blank,
    Number(f64),
    Boolean(bool),
    Error(CellError),
    /// Error cell whose text is not a known error value
    ErrorText(String),
    Text(SharedString),
    RichText(RichString),
    DateTime(NaiveDateTime),
    Formula(TokenSequence),
    /// Member of a shared-formula group
    SharedFormula(u32),
}

/// A cell as stored by [`MemorySheet`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StoredCell {
    pub xf_id: Option<u32>,
    pub show_phonetic: bool,
    pub content: CellContent,
    pub inline_format: Option<Biff2CellFormat>,
}

/// Shared-formula definitions of one worksheet
#[derive(Debug, Clone, Default)]
pub struct SharedFormulaRegistry {
    formulas: AHashMap<SharedFormulaKey, TokenSequence>,
}

impl SharedFormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Returns `false` (keeping the first definition)
    /// when the key is already registered.
    pub fn register(&mut self, key: SharedFormulaKey, tokens: TokenSequence) -> bool {
        if self.formulas.contains_key(&key) {
            return false;
        }
        self.formulas.insert(key, tokens);
        true
    }

    pub fn get(&self, key: &SharedFormulaKey) -> Option<&TokenSequence> {
        self.formulas.get(key)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Registered keys in a stable order
    pub fn keys(&self) -> Vec<SharedFormulaKey> {
        let mut keys: Vec<_> = self.formulas.keys().copied().collect();
        keys.sort();
        keys
    }
}

/// Worksheet content collected from one import pass
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    shared_strings: SharedStrings,
    rows: BTreeMap<i32, RowModel>,
    cells: BTreeMap<(u32, u16), StoredCell>,
    shared_formulas: SharedFormulaRegistry,
    array_formulas: Vec<(CellRange, TokenSequence)>,
    table_operations: Vec<(CellRange, TableData)>,
    used_area: Option<CellRange>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sheet that resolves shared-string cells against `strings`
    pub fn with_shared_strings(strings: SharedStrings) -> Self {
        Self {
            shared_strings: strings,
            ..Self::default()
        }
    }

    /// Row model of the given 1-based row
    pub fn row(&self, row: i32) -> Option<&RowModel> {
        self.rows.get(&row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &RowModel> {
        self.rows.values()
    }

    pub fn cell(&self, addr: CellAddress) -> Option<&StoredCell> {
        self.cells.get(&(addr.row, addr.col))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &StoredCell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellAddress::new(row, col), cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn shared_formulas(&self) -> &SharedFormulaRegistry {
        &self.shared_formulas
    }

    pub fn array_formulas(&self) -> &[(CellRange, TokenSequence)] {
        &self.array_formulas
    }

    pub fn table_operations(&self) -> &[(CellRange, TableData)] {
        &self.table_operations
    }

    /// Smallest range containing every resolved cell
    pub fn used_area(&self) -> Option<CellRange> {
        self.used_area
    }

    fn store(&mut self, cell: &CellData, content: CellContent) {
        let key = (cell.address.row, cell.address.col);
        let inline_format = self.cells.get(&key).and_then(|c| c.inline_format);
        self.cells.insert(
            key,
            StoredCell {
                xf_id: cell.xf_id,
                show_phonetic: cell.show_phonetic,
                content,
                inline_format,
            },
        );
    }
}

impl SheetDataSink for MemorySheet {
    fn set_row_model(&mut self, row: &RowModel) {
        self.rows.insert(row.row, row.clone());
    }

    fn set_value_cell(&mut self, cell: &CellData, value: f64) {
        self.store(cell, CellContent::Number(value));
    }

    fn set_boolean_cell(&mut self, cell: &CellData, value: bool) {
        self.store(cell, CellContent::Boolean(value));
    }

    fn set_error_code_cell(&mut self, cell: &CellData, code: u8) {
        let content = match CellError::from_code(code) {
            Some(err) => CellContent::Error(err),
            None => {
                log::warn!("unknown error code 0x{:02X} at {}", code, cell.address);
                CellContent::ErrorText(format!("#ERR{}", code))
            }
        };
        self.store(cell, content);
    }

    fn set_error_cell(&mut self, cell: &CellData, text: &str) {
        let content = match CellError::from_text(text) {
            Some(err) => CellContent::Error(err),
            None => CellContent::ErrorText(text.to_string()),
        };
        self.store(cell, content);
    }

    fn set_string_cell(&mut self, cell: &CellData, text: &str) {
        self.store(cell, CellContent::Text(SharedString::new(text)));
    }

    fn set_shared_string_cell(&mut self, cell: &CellData, index: i32) {
        let content = match self.shared_strings.get(index) {
            Some(s) => CellContent::Text(s.clone()),
            None => {
                log::warn!(
                    "shared string index {} out of range ({} strings) at {}",
                    index,
                    self.shared_strings.len(),
                    cell.address
                );
                CellContent::Blank
            }
        };
        self.store(cell, content);
    }

    fn set_rich_string_cell(&mut self, cell: &CellData, text: &RichString) {
        let content = if text.runs().len() <= 1 {
            CellContent::Text(SharedString::new(text.text()))
        } else {
            CellContent::RichText(text.clone())
        };
        self.store(cell, content);
    }

    fn set_date_time_cell(&mut self, cell: &CellData, value: NaiveDateTime) {
        self.store(cell, CellContent::DateTime(value));
    }

    fn set_blank_cell(&mut self, cell: &CellData) {
        self.store(cell, CellContent::Blank);
    }

    fn set_formula_cell(&mut self, cell: &CellData, tokens: TokenSequence) {
        self.store(cell, CellContent::Formula(tokens));
    }

    fn set_shared_formula_cell(&mut self, cell: &CellData, shared_id: u32) {
        self.store(cell, CellContent::SharedFormula(shared_id));
    }

    fn create_shared_formula(&mut self, key: SharedFormulaKey, tokens: TokenSequence) {
        if !self.shared_formulas.register(key, tokens) {
            log::warn!("shared formula {:?} already defined, keeping the first", key);
        }
    }

    fn create_array_formula(&mut self, range: CellRange, tokens: TokenSequence) {
        self.array_formulas.push((range, tokens));
    }

    fn create_table_operation(&mut self, range: CellRange, table: &TableData) {
        self.table_operations.push((range, table.clone()));
    }

    fn extend_used_area(&mut self, addr: CellAddress) {
        self.used_area = Some(match self.used_area {
            Some(area) => area.union_with(addr),
            None => CellRange::single(addr),
        });
    }

    fn set_inline_cell_format(&mut self, cell: &CellData, format: Biff2CellFormat) {
        let key = (cell.address.row, cell.address.col);
        self.cells
            .entry(key)
            .or_insert_with(|| StoredCell {
                xf_id: cell.xf_id,
                show_phonetic: cell.show_phonetic,
                content: CellContent::Blank,
                inline_format: None,
            })
            .inline_format = Some(format);
    }
}
