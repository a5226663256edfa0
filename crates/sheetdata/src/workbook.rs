//! Format-independent workbook access

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use sheetdata_core::{
    FormulaParser, ImportOptions, ImportedSheet, MemorySheet, SharedStrings, SheetDataSink,
    SheetInfo, VerbatimFormulaParser,
};

#[cfg(feature = "xls")]
use sheetdata_xls::XlsReader;
#[cfg(feature = "xlsb")]
use sheetdata_xlsb::XlsbReader;
#[cfg(feature = "xlsx")]
use sheetdata_xlsx::XlsxReader;

use crate::error::{Error, Result};
use crate::Format;

/// An open workbook of any supported format
pub enum Workbook {
    #[cfg(feature = "xlsx")]
    Xlsx(XlsxReader<Cursor<Vec<u8>>>),
    #[cfg(feature = "xlsb")]
    Xlsb(XlsbReader<Cursor<Vec<u8>>>),
    #[cfg(feature = "xls")]
    Xls(XlsReader),
}

impl Workbook {
    /// Open the workbook at `path`, detecting its format from the content
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Read a workbook from `reader`
    pub fn open<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Open a workbook held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = Format::detect(&bytes).ok_or(Error::UnknownFormat)?;
        log::debug!("detected {} workbook", format);
        match format {
            #[cfg(feature = "xlsx")]
            Format::Xlsx => Ok(Workbook::Xlsx(XlsxReader::open(Cursor::new(bytes))?)),
            #[cfg(feature = "xlsb")]
            Format::Xlsb => Ok(Workbook::Xlsb(XlsbReader::open(Cursor::new(bytes))?)),
            #[cfg(feature = "xls")]
            Format::Xls => Ok(Workbook::Xls(XlsReader::open(Cursor::new(bytes))?)),
            #[allow(unreachable_patterns)]
            other => Err(Error::Disabled(other)),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            #[cfg(feature = "xlsx")]
            Workbook::Xlsx(_) => Format::Xlsx,
            #[cfg(feature = "xlsb")]
            Workbook::Xlsb(_) => Format::Xlsb,
            #[cfg(feature = "xls")]
            Workbook::Xls(_) => Format::Xls,
        }
    }

    /// Worksheets in workbook order
    pub fn sheets(&self) -> &[SheetInfo] {
        match self {
            #[cfg(feature = "xlsx")]
            Workbook::Xlsx(r) => r.sheets(),
            #[cfg(feature = "xlsb")]
            Workbook::Xlsb(r) => r.sheets(),
            #[cfg(feature = "xls")]
            Workbook::Xls(r) => r.sheets(),
        }
    }

    /// The workbook shared-string table
    pub fn shared_strings(&self) -> &SharedStrings {
        match self {
            #[cfg(feature = "xlsx")]
            Workbook::Xlsx(r) => r.shared_strings(),
            #[cfg(feature = "xlsb")]
            Workbook::Xlsb(r) => r.shared_strings(),
            #[cfg(feature = "xls")]
            Workbook::Xls(r) => r.shared_strings(),
        }
    }

    /// Decode one worksheet into `sink`
    pub fn decode_sheet<S: SheetDataSink>(
        &mut self,
        index: usize,
        formulas: &dyn FormulaParser,
        sink: S,
    ) -> Result<S> {
        Ok(match self {
            #[cfg(feature = "xlsx")]
            Workbook::Xlsx(r) => r.decode_sheet(index, formulas, sink)?,
            #[cfg(feature = "xlsb")]
            Workbook::Xlsb(r) => r.decode_sheet(index, formulas, sink)?,
            #[cfg(feature = "xls")]
            Workbook::Xls(r) => r.decode_sheet(index, formulas, sink)?,
        })
    }

    /// Decode the selected worksheets, each into a fresh sink
    ///
    /// A worksheet that fails to decode is logged and left out.
    pub fn read_sheets<S, F>(
        &mut self,
        options: &ImportOptions,
        formulas: &dyn FormulaParser,
        make_sink: F,
    ) -> Result<Vec<ImportedSheet<S>>>
    where
        S: SheetDataSink,
        F: FnMut(&SheetInfo, &SharedStrings) -> S,
    {
        Ok(match self {
            #[cfg(feature = "xlsx")]
            Workbook::Xlsx(r) => r.read_sheets(options, formulas, make_sink)?,
            #[cfg(feature = "xlsb")]
            Workbook::Xlsb(r) => r.read_sheets(options, formulas, make_sink)?,
            #[cfg(feature = "xls")]
            Workbook::Xls(r) => r.read_sheets(options, formulas, make_sink)?,
        })
    }

    /// Decode the selected worksheets into [`MemorySheet`]s
    pub fn read_with(&mut self, options: &ImportOptions) -> Result<Vec<ImportedSheet<MemorySheet>>> {
        self.read_sheets(options, &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
    }

    /// Decode every worksheet into a [`MemorySheet`]
    pub fn read_all(&mut self) -> Result<Vec<ImportedSheet<MemorySheet>>> {
        self.read_with(&ImportOptions::default())
    }
}
