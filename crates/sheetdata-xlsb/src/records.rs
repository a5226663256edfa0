//! BIFF12 record identifiers
//!
//! Identifiers are the raw little-endian value of the id bytes with their
//! continuation bits kept, which is how [`crate::stream`] reads them.

// Workbook stream
pub const SHEET: u32 = 0x019C;
pub const SHEETS_END: u32 = 0x0190;

// Shared string table
pub const SST: u32 = 0x019F;
pub const SST_ITEM: u32 = 0x0013;
pub const SST_END: u32 = 0x01A0;

// Worksheet stream
pub const SHEETDATA: u32 = 0x0191;
pub const SHEETDATA_END: u32 = 0x0192;
pub const ROW: u32 = 0x0000;

pub const CELL_BLANK: u32 = 0x0001;
pub const CELL_RK: u32 = 0x0002;
pub const CELL_ERROR: u32 = 0x0003;
pub const CELL_BOOL: u32 = 0x0004;
pub const CELL_DOUBLE: u32 = 0x0005;
pub const CELL_STRING: u32 = 0x0006;
pub const CELL_SI: u32 = 0x0007;
pub const CELL_RSTRING: u32 = 0x003E;

pub const FORMULA_STRING: u32 = 0x0008;
pub const FORMULA_DOUBLE: u32 = 0x0009;
pub const FORMULA_BOOL: u32 = 0x000A;
pub const FORMULA_ERROR: u32 = 0x000B;

pub const MULTCELL_BLANK: u32 = 0x000C;
pub const MULTCELL_RK: u32 = 0x000D;
pub const MULTCELL_ERROR: u32 = 0x000E;
pub const MULTCELL_BOOL: u32 = 0x000F;
pub const MULTCELL_DOUBLE: u32 = 0x0010;
pub const MULTCELL_STRING: u32 = 0x0011;
pub const MULTCELL_SI: u32 = 0x0012;
pub const MULTCELL_RSTRING: u32 = 0x003D;

pub const ARRAY: u32 = 0x01AA;
pub const SHAREDFMLA: u32 = 0x01AB;
pub const DATATABLE: u32 = 0x01AC;

// Row record flags
pub(crate) const ROW_THICKTOP: u16 = 0x0001;
pub(crate) const ROW_THICKBOTTOM: u16 = 0x0002;
pub(crate) const ROW_COLLAPSED: u16 = 0x0800;
pub(crate) const ROW_HIDDEN: u16 = 0x1000;
pub(crate) const ROW_CUSTOMHEIGHT: u16 = 0x2000;
pub(crate) const ROW_CUSTOMFORMAT: u16 = 0x4000;
pub(crate) const ROW_SHOWPHONETIC: u8 = 0x01;

// Cell header format word
pub(crate) const CELL_XF_MASK: u32 = 0x00FF_FFFF;
pub(crate) const CELL_SHOWPHONETIC: u32 = 0x0100_0000;

// Data table flags
pub(crate) const DATATABLE_ROW: u8 = 0x01;
pub(crate) const DATATABLE_2D: u8 = 0x02;
pub(crate) const DATATABLE_REF1DEL: u8 = 0x04;
pub(crate) const DATATABLE_REF2DEL: u8 = 0x08;

/// How a cell record locates its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellShape {
    /// Explicit column, literal value
    Value,
    /// Explicit column, cached result followed by a formula
    Formula,
    /// Column follows the previous cell in the row
    Multi,
}

/// Body layout of a cell record after its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueLayout {
    Blank,
    Rk,
    Error,
    Bool,
    Double,
    String,
    SharedString,
    RichString,
}

const CELL_RECORDS: &[(u32, CellShape, ValueLayout)] = &[
    (CELL_BLANK, CellShape::Value, ValueLayout::Blank),
    (CELL_RK, CellShape::Value, ValueLayout::Rk),
    (CELL_ERROR, CellShape::Value, ValueLayout::Error),
    (CELL_BOOL, CellShape::Value, ValueLayout::Bool),
    (CELL_DOUBLE, CellShape::Value, ValueLayout::Double),
    (CELL_STRING, CellShape::Value, ValueLayout::String),
    (CELL_SI, CellShape::Value, ValueLayout::SharedString),
    (CELL_RSTRING, CellShape::Value, ValueLayout::RichString),
    (FORMULA_STRING, CellShape::Formula, ValueLayout::String),
    (FORMULA_DOUBLE, CellShape::Formula, ValueLayout::Double),
    (FORMULA_BOOL, CellShape::Formula, ValueLayout::Bool),
    (FORMULA_ERROR, CellShape::Formula, ValueLayout::Error),
    (MULTCELL_BLANK, CellShape::Multi, ValueLayout::Blank),
    (MULTCELL_RK, CellShape::Multi, ValueLayout::Rk),
    (MULTCELL_ERROR, CellShape::Multi, ValueLayout::Error),
    (MULTCELL_BOOL, CellShape::Multi, ValueLayout::Bool),
    (MULTCELL_DOUBLE, CellShape::Multi, ValueLayout::Double),
    (MULTCELL_STRING, CellShape::Multi, ValueLayout::String),
    (MULTCELL_SI, CellShape::Multi, ValueLayout::SharedString),
    (MULTCELL_RSTRING, CellShape::Multi, ValueLayout::RichString),
];

/// Look up the layout of a cell record
pub(crate) fn cell_record(id: u32) -> Option<(CellShape, ValueLayout)> {
    CELL_RECORDS
        .iter()
        .find(|(record_id, _, _)| *record_id == id)
        .map(|&(_, shape, layout)| (shape, layout))
}
