//! Workbook format detection

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use sheetdata_core::BiffVersion;

/// First bytes of a ZIP local file header
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// First bytes of every compound file
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Container format of a workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// SpreadsheetML package with XML worksheets
    Xlsx,
    /// Package with BIFF12 worksheets
    Xlsb,
    /// BIFF2-BIFF8 record stream, bare or inside a compound file
    Xls,
}

impl Format {
    /// Detect the format from the leading bytes of a workbook.
    ///
    /// ZIP packages are told apart by their workbook part.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&ZIP_SIGNATURE) {
            return Self::detect_package(bytes);
        }
        if bytes.starts_with(&CFB_SIGNATURE) {
            return Some(Format::Xls);
        }
        if bytes.len() >= 4 && BiffVersion::is_bof(u16::from_le_bytes([bytes[0], bytes[1]])) {
            return Some(Format::Xls);
        }
        None
    }

    fn detect_package(bytes: &[u8]) -> Option<Self> {
        let archive = match zip::ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(e) => {
                log::debug!("not a readable ZIP package: {}", e);
                return None;
            }
        };
        let mut names = archive.file_names();
        let found = names.find_map(|name| match name {
            "xl/workbook.xml" => Some(Format::Xlsx),
            "xl/workbook.bin" => Some(Format::Xlsb),
            _ => None,
        });
        found
    }

    /// Guess the format from a file extension
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Some(Format::Xlsx),
            Some("xlsb") => Some(Format::Xlsb),
            Some("xls") => Some(Format::Xls),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Xlsx => "XLSX",
            Format::Xlsb => "XLSB",
            Format::Xls => "XLS",
        };
        f.write_str(name)
    }
}
