//! Rows, cells, formulas and table operations as decoded from a worksheet

use crate::cell::{CellAddress, CellRange, CellType};

/// A closed integer interval `[first, last]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub first: i32,
    pub last: i32,
}

impl ValueRange {
    pub const fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    /// Whether the two intervals overlap or are adjacent
    pub fn touches(&self, other: &ValueRange) -> bool {
        self.first <= other.last.saturating_add(1) && other.first <= self.last.saturating_add(1)
    }
}

/// Row-level properties, one per decoded row record or element
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowModel {
    /// 1-based row index
    pub row: i32,
    /// Height in points, -1 for the default height
    pub height: f64,
    /// Row format id, if the row has one
    pub xf_id: Option<u32>,
    /// Outline level (0-7)
    pub level: u8,
    pub custom_height: bool,
    pub custom_format: bool,
    pub show_phonetic: bool,
    pub hidden: bool,
    pub collapsed: bool,
    pub thick_top: bool,
    pub thick_bottom: bool,
    col_spans: Vec<ValueRange>,
}

impl Default for RowModel {
    fn default() -> Self {
        Self {
            row: -1,
            height: -1.0,
            xf_id: None,
            level: 0,
            custom_height: false,
            custom_format: false,
            show_phonetic: false,
            hidden: false,
            collapsed: false,
            thick_top: false,
            thick_bottom: false,
            col_spans: Vec::new(),
        }
    }
}

impl RowModel {
    /// Create a row model for the given 1-based row
    pub fn new(row: i32) -> Self {
        Self {
            row,
            ..Self::default()
        }
    }

    /// Used column spans, ascending and disjoint
    pub fn col_spans(&self) -> &[ValueRange] {
        &self.col_spans
    }

    /// Insert a 0-based column span.
    ///
    /// `last` is clamped to `max_col`. A span that is empty after clamping or
    /// starts before column 0 is dropped. Overlapping or adjacent spans merge.
    pub fn insert_col_span(&mut self, first: i32, last: i32, max_col: i32) {
        let last = last.min(max_col);
        if first < 0 || first > last {
            return;
        }

        let mut merged = ValueRange::new(first, last);
        let mut spans = Vec::with_capacity(self.col_spans.len() + 1);
        let mut inserted = false;
        for span in self.col_spans.drain(..) {
            if span.touches(&merged) {
                merged.first = merged.first.min(span.first);
                merged.last = merged.last.max(span.last);
            } else if span.last < merged.first {
                spans.push(span);
            } else {
                if !inserted {
                    spans.push(merged);
                    inserted = true;
                }
                spans.push(span);
            }
        }
        if !inserted {
            spans.push(merged);
        }
        self.col_spans = spans;
    }
}

/// Transient description of one decoded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellData {
    /// Sheet index inside the workbook
    pub sheet: u16,
    pub address: CellAddress,
    pub cell_type: CellType,
    /// Cell format id, if any
    pub xf_id: Option<u32>,
    /// Phonetic text should be displayed
    pub show_phonetic: bool,
}

impl CellData {
    pub fn new(sheet: u16, address: CellAddress) -> Self {
        Self {
            sheet,
            address,
            cell_type: CellType::Unset,
            xf_id: None,
            show_phonetic: false,
        }
    }
}

/// How a formula element or record relates to other cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaKind {
    /// Formula owned by this cell
    #[default]
    Normal,
    /// Member of a shared-formula group
    Shared,
    /// Multi-cell array formula
    Array,
    /// What-if data table
    DataTable,
    /// Any other kind; the cell falls back to its cached value
    Unknown,
}

impl FormulaKind {
    /// Map the SpreadsheetML `t` attribute of `<f>`
    pub fn from_xml_token(token: Option<&str>) -> Self {
        match token {
            None | Some("normal") => FormulaKind::Normal,
            Some("shared") => FormulaKind::Shared,
            Some("array") => FormulaKind::Array,
            Some("dataTable") => FormulaKind::DataTable,
            Some(_) => FormulaKind::Unknown,
        }
    }
}

/// Formula descriptor of the current cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormulaData {
    pub kind: FormulaKind,
    /// Declared range; `None` when absent or malformed
    pub range: Option<CellRange>,
    /// Shared-group id
    pub shared_id: Option<u32>,
}

impl FormulaData {
    /// Whether `addr` is the top-left cell of the declared range
    pub fn is_anchor(&self, addr: CellAddress) -> bool {
        self.range.map_or(false, |range| range.start == addr)
    }

    /// A shared formula definition is registered only at its anchor
    pub fn is_valid_shared_ref(&self, addr: CellAddress) -> bool {
        self.kind == FormulaKind::Shared && self.shared_id.is_some() && self.is_anchor(addr)
    }

    /// An array formula is registered only at its anchor
    pub fn is_valid_array_ref(&self, addr: CellAddress) -> bool {
        self.kind == FormulaKind::Array && self.is_anchor(addr)
    }
}

/// Data table (table operation) descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableData {
    /// First input cell, A1 text
    pub ref1: String,
    /// Second input cell (two-dimensional tables), A1 text
    pub ref2: String,
    /// Input values are laid out in a row
    pub row_table: bool,
    pub two_dimensional: bool,
    pub ref1_deleted: bool,
    pub ref2_deleted: bool,
}

/// Inline cell attributes of BIFF2 cell records (three bytes)
///
/// | byte | bits | field |
/// |---|---|---|
/// | 0 | 0-5 | XF index |
/// | 0 | 6 | locked |
/// | 0 | 7 | formula hidden |
/// | 1 | 0-5 | number format index |
/// | 1 | 6-7 | font index |
/// | 2 | 0-2 | horizontal alignment |
/// | 2 | 3-6 | left, right, top, bottom border |
/// | 2 | 7 | shaded background |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Biff2CellFormat {
    pub xf_index: u8,
    pub locked: bool,
    pub formula_hidden: bool,
    pub number_format: u8,
    pub font: u8,
    pub horizontal_alignment: u8,
    pub border_left: bool,
    pub border_right: bool,
    pub border_top: bool,
    pub border_bottom: bool,
    pub shaded: bool,
}

impl Biff2CellFormat {
    /// Decode the three attribute bytes
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let bit = |byte: u8, n: u8| byte & (1 << n) != 0;
        Self {
            xf_index: bytes[0] & 0x3F,
            locked: bit(bytes[0], 6),
            formula_hidden: bit(bytes[0], 7),
            number_format: bytes[1] & 0x3F,
            font: bytes[1] >> 6,
            horizontal_alignment: bytes[2] & 0x07,
            border_left: bit(bytes[2], 3),
            border_right: bit(bytes[2], 4),
            border_top: bit(bytes[2], 5),
            border_bottom: bit(bytes[2], 6),
            shaded: bit(bytes[2], 7),
        }
    }
}
