//! Legacy BIFF version detection and per-version byte layouts.

use crate::binary::read_u16;
use crate::error::{Error, Result};

/// BOF record ids, one per BIFF generation
pub const BOF_BIFF2: u16 = 0x0009;
pub const BOF_BIFF3: u16 = 0x0209;
pub const BOF_BIFF4: u16 = 0x0409;
pub const BOF_BIFF5: u16 = 0x0809;

/// Legacy binary format generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BiffVersion {
    /// Excel 2.x
    Biff2,
    /// Excel 3.0
    Biff3,
    /// Excel 4.0
    Biff4,
    /// Excel 5.0 / 95 (BIFF5 and BIFF7 share a layout)
    Biff5,
    /// Excel 97-2003
    Biff8,
}

/// How a cell record carries its format id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XfShape {
    /// 6-bit id in the first inline attribute byte; 63 defers to the
    /// preceding IXFE record
    NarrowWithIndirection,
    /// Full 16-bit XF index
    Full16,
}

/// How label strings are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringShape {
    /// Length-prefixed bytes in the workbook code page
    ByteString,
    /// BIFF8 XLUnicodeString (16-bit length, flags byte, compressed or UTF-16)
    Unicode,
}

/// Byte layout parameters of one BIFF version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiffLayout {
    /// Bytes between the cached result and the formula tokens in FORMULA
    pub formula_skip: usize,
    /// Flag bytes between the range and the tokens in ARRAY
    pub array_skip: usize,
    /// Format id encoding in cell records
    pub xf_shape: XfShape,
    /// Number of addressable rows
    pub max_rows: u32,
    /// Number of addressable columns
    pub max_cols: u16,
    /// Label string encoding
    pub strings: StringShape,
}

const BIFF2_LAYOUT: BiffLayout = BiffLayout {
    formula_skip: 9,
    array_skip: 1,
    xf_shape: XfShape::NarrowWithIndirection,
    max_rows: 16_384,
    max_cols: 256,
    strings: StringShape::ByteString,
};

const BIFF3_LAYOUT: BiffLayout = BiffLayout {
    formula_skip: 10,
    array_skip: 2,
    xf_shape: XfShape::Full16,
    max_rows: 16_384,
    max_cols: 256,
    strings: StringShape::ByteString,
};

const BIFF5_LAYOUT: BiffLayout = BiffLayout {
    formula_skip: 14,
    array_skip: 6,
    xf_shape: XfShape::Full16,
    max_rows: 16_384,
    max_cols: 256,
    strings: StringShape::ByteString,
};

const BIFF8_LAYOUT: BiffLayout = BiffLayout {
    formula_skip: 14,
    array_skip: 6,
    xf_shape: XfShape::Full16,
    max_rows: 65_536,
    max_cols: 256,
    strings: StringShape::Unicode,
};

impl BiffVersion {
    /// Detect the version from a BOF record.
    ///
    /// BIFF2 to BIFF4 are identified by the record id alone; BIFF5 and BIFF8
    /// share id 0x0809 and differ in the version field.
    pub fn detect(bof_record_id: u16, data: &[u8]) -> Result<Self> {
        match bof_record_id {
            BOF_BIFF2 => Ok(BiffVersion::Biff2),
            BOF_BIFF3 => Ok(BiffVersion::Biff3),
            BOF_BIFF4 => Ok(BiffVersion::Biff4),
            BOF_BIFF5 => {
                let mut offset = 0;
                let version = read_u16(data, &mut offset)?;
                match version {
                    0x0500 => Ok(BiffVersion::Biff5),
                    0x0600 => Ok(BiffVersion::Biff8),
                    _ => Err(Error::UnsupportedVersion {
                        record_id: bof_record_id,
                        version,
                    }),
                }
            }
            _ => Err(Error::UnsupportedVersion {
                record_id: bof_record_id,
                version: 0,
            }),
        }
    }

    /// Whether `record_id` is a BOF record of any version
    pub fn is_bof(record_id: u16) -> bool {
        matches!(record_id, BOF_BIFF2 | BOF_BIFF3 | BOF_BIFF4 | BOF_BIFF5)
    }

    /// The layout table entry for this version
    pub fn layout(self) -> &'static BiffLayout {
        match self {
            BiffVersion::Biff2 => &BIFF2_LAYOUT,
            BiffVersion::Biff3 | BiffVersion::Biff4 => &BIFF3_LAYOUT,
            BiffVersion::Biff5 => &BIFF5_LAYOUT,
            BiffVersion::Biff8 => &BIFF8_LAYOUT,
        }
    }
}

impl std::fmt::Display for BiffVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BiffVersion::Biff2 => "BIFF2",
            BiffVersion::Biff3 => "BIFF3",
            BiffVersion::Biff4 => "BIFF4",
            BiffVersion::Biff5 => "BIFF5",
            BiffVersion::Biff8 => "BIFF8",
        };
        f.write_str(name)
    }
}
