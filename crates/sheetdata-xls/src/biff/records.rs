//! Legacy BIFF record identifiers and the per-version record table.
//!
//! Reference: [MS-XLS] §2.3 and the BIFF2-BIFF5 record lists. Records that
//! changed layout between generations kept the low byte of their id and
//! moved to 0x02xx (0x04xx for the BIFF4 FORMULA record).

use sheetdata_core::{BiffVersion, XfShape};

// ── Stream structure ────────────────────────────────────────────────────
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// ── Workbook globals ────────────────────────────────────────────────────
pub const CODEPAGE: u16 = 0x0042;
pub const BOUNDSHEET: u16 = 0x0085;
pub const SST: u16 = 0x00FC;
pub const FONT: u16 = 0x0031; // BIFF2, BIFF5, BIFF8
pub const BIFF3_FONT: u16 = 0x0231; // BIFF3, BIFF4
pub const BIFF2_XF: u16 = 0x0043;
pub const BIFF3_XF: u16 = 0x0243;
pub const BIFF4_XF: u16 = 0x0443;
pub const BIFF5_XF: u16 = 0x00E0; // BIFF5, BIFF8

// ── Sheet data ──────────────────────────────────────────────────────────
pub const BIFF2_BLANK: u16 = 0x0001;
pub const BIFF3_BLANK: u16 = 0x0201;
pub const BIFF2_INTEGER: u16 = 0x0002;
pub const BIFF2_NUMBER: u16 = 0x0003;
pub const BIFF3_NUMBER: u16 = 0x0203;
pub const BIFF2_LABEL: u16 = 0x0004;
pub const BIFF3_LABEL: u16 = 0x0204;
pub const BIFF2_BOOLERR: u16 = 0x0005;
pub const BIFF3_BOOLERR: u16 = 0x0205;
pub const BIFF2_FORMULA: u16 = 0x0006;
pub const BIFF3_FORMULA: u16 = 0x0206;
pub const BIFF4_FORMULA: u16 = 0x0406;
pub const BIFF5_FORMULA: u16 = 0x0006;
pub const BIFF2_STRING: u16 = 0x0007;
pub const BIFF3_STRING: u16 = 0x0207;
pub const BIFF2_ROW: u16 = 0x0008;
pub const BIFF3_ROW: u16 = 0x0208;
pub const BIFF2_ARRAY: u16 = 0x0021;
pub const BIFF3_ARRAY: u16 = 0x0221;
pub const BIFF2_DATATABLE: u16 = 0x0036;
pub const BIFF2_DATATABLE2: u16 = 0x0037;
pub const BIFF3_DATATABLE: u16 = 0x0236;
pub const IXFE: u16 = 0x0044;
pub const RK: u16 = 0x027E;
pub const MULRK: u16 = 0x00BD;
pub const MULBLANK: u16 = 0x00BE;
pub const RSTRING: u16 = 0x00D6;
pub const LABELSST: u16 = 0x00FD;
pub const SHAREDFMLA: u16 = 0x04BC;

// ── Field values ────────────────────────────────────────────────────────
pub(crate) const BOF_WORKSHEET: u16 = 0x0010;
pub(crate) const CODEPAGE_UTF16: u16 = 1200;

pub(crate) const ROW_COLLAPSED: u32 = 0x0000_0010;
pub(crate) const ROW_HIDDEN: u32 = 0x0000_0020;
pub(crate) const ROW_CUSTOMHEIGHT: u32 = 0x0000_0040;
pub(crate) const ROW_CUSTOMFORMAT: u32 = 0x0000_0080;
pub(crate) const ROW_THICKTOP: u32 = 0x1000_0000;
pub(crate) const ROW_THICKBOTTOM: u32 = 0x2000_0000;
pub(crate) const ROW_SHOWPHONETIC: u32 = 0x4000_0000;
pub(crate) const BIFF2_ROW_CUSTOMFORMAT: u8 = 0x01;

pub(crate) const BOOLERR_BOOL: u8 = 0;
pub(crate) const BOOLERR_ERROR: u8 = 1;

pub(crate) const BIFF2_XF_MASK: u8 = 0x3F;
pub(crate) const BIFF2_XF_USE_IXFE: u8 = 63;

pub(crate) const DATATABLE_ROW: u16 = 0x0004;
pub(crate) const DATATABLE_2D: u16 = 0x0008;
pub(crate) const DATATABLE_REF1DEL: u16 = 0x0010;
pub(crate) const DATATABLE_REF2DEL: u16 = 0x0020;

/// Marker in the top two bytes of a non-numeric formula result
pub(crate) const FORMULA_RESULT_SPECIAL: u16 = 0xFFFF;
pub(crate) const FORMULA_RESULT_STRING: u8 = 0;
pub(crate) const FORMULA_RESULT_BOOL: u8 = 1;
pub(crate) const FORMULA_RESULT_ERROR: u8 = 2;
pub(crate) const FORMULA_RESULT_EMPTY: u8 = 3;

/// Layout of a data table record after its range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableShape {
    /// One-dimensional BIFF2 table: row flag byte and one input cell
    Biff2,
    /// Two-dimensional BIFF2 table: two input cells
    Biff2TwoDim,
    /// Flag word and two input cells
    Flags,
}

/// What a sheet-data record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Row,
    Blank,
    Integer,
    Number,
    Rk,
    BoolErr,
    Label,
    RichLabel,
    LabelSst,
    MultiBlank,
    MultiRk,
    Formula,
    FormulaString,
    Array,
    SharedFormula,
    DataTable(TableShape),
    Ixfe,
}

/// One row of the record table
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordEntry {
    pub id: u16,
    pub kind: RecordKind,
    /// Format id encoding of the cell header, `None` for non-cell records
    pub xf: Option<XfShape>,
    pub versions: &'static [BiffVersion],
}

use BiffVersion::{Biff2 as B2, Biff3 as B3, Biff4 as B4, Biff5 as B5, Biff8 as B8};

const ALL: &[BiffVersion] = &[B2, B3, B4, B5, B8];
const FROM_BIFF3: &[BiffVersion] = &[B3, B4, B5, B8];
const FROM_BIFF5: &[BiffVersion] = &[B5, B8];

const NARROW: Option<XfShape> = Some(XfShape::NarrowWithIndirection);
const FULL: Option<XfShape> = Some(XfShape::Full16);

const fn entry(
    id: u16,
    kind: RecordKind,
    xf: Option<XfShape>,
    versions: &'static [BiffVersion],
) -> RecordEntry {
    RecordEntry {
        id,
        kind,
        xf,
        versions,
    }
}

const SHEET_DATA_RECORDS: &[RecordEntry] = &[
    entry(BIFF2_ARRAY, RecordKind::Array, None, ALL),
    entry(BIFF3_ARRAY, RecordKind::Array, None, ALL),
    entry(BIFF2_BLANK, RecordKind::Blank, NARROW, ALL),
    entry(BIFF3_BLANK, RecordKind::Blank, FULL, ALL),
    entry(BIFF2_BOOLERR, RecordKind::BoolErr, NARROW, ALL),
    entry(BIFF3_BOOLERR, RecordKind::BoolErr, FULL, ALL),
    entry(BIFF2_INTEGER, RecordKind::Integer, NARROW, ALL),
    entry(IXFE, RecordKind::Ixfe, None, ALL),
    entry(BIFF2_LABEL, RecordKind::Label, NARROW, ALL),
    entry(BIFF3_LABEL, RecordKind::Label, FULL, ALL),
    entry(BIFF2_NUMBER, RecordKind::Number, NARROW, ALL),
    entry(BIFF3_NUMBER, RecordKind::Number, FULL, ALL),
    entry(RK, RecordKind::Rk, FULL, ALL),
    entry(
        BIFF2_DATATABLE,
        RecordKind::DataTable(TableShape::Biff2),
        None,
        &[B2],
    ),
    entry(
        BIFF2_DATATABLE2,
        RecordKind::DataTable(TableShape::Biff2TwoDim),
        None,
        &[B2],
    ),
    entry(
        BIFF3_DATATABLE,
        RecordKind::DataTable(TableShape::Flags),
        None,
        FROM_BIFF3,
    ),
    entry(BIFF2_FORMULA, RecordKind::Formula, NARROW, &[B2]),
    entry(BIFF3_FORMULA, RecordKind::Formula, FULL, &[B3, B5, B8]),
    entry(BIFF4_FORMULA, RecordKind::Formula, FULL, &[B4, B5, B8]),
    entry(BIFF5_FORMULA, RecordKind::Formula, FULL, FROM_BIFF5),
    entry(BIFF2_STRING, RecordKind::FormulaString, None, &[B2]),
    entry(BIFF3_STRING, RecordKind::FormulaString, None, FROM_BIFF3),
    entry(BIFF2_ROW, RecordKind::Row, None, &[B2]),
    entry(BIFF3_ROW, RecordKind::Row, None, FROM_BIFF3),
    entry(MULBLANK, RecordKind::MultiBlank, FULL, FROM_BIFF5),
    entry(MULRK, RecordKind::MultiRk, FULL, FROM_BIFF5),
    entry(RSTRING, RecordKind::RichLabel, FULL, FROM_BIFF5),
    entry(SHAREDFMLA, RecordKind::SharedFormula, None, FROM_BIFF5),
    entry(LABELSST, RecordKind::LabelSst, FULL, &[B8]),
];

/// Look up a sheet-data record as understood by `version`
pub(crate) fn sheet_data_record(version: BiffVersion, id: u16) -> Option<&'static RecordEntry> {
    SHEET_DATA_RECORDS
        .iter()
        .find(|e| e.id == id && e.versions.contains(&version))
}
