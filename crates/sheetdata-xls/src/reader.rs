//! XLS reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container and reads its `Workbook`
//! (BIFF8) or `Book` (BIFF5) stream, or takes a bare BIFF2-BIFF4 stream as
//! is. The workbook globals are parsed up front; worksheets are decoded on
//! demand.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::ops::Range;
use std::path::Path;

use sheetdata_core::binary::{read_u16, read_u32, read_u8};
use sheetdata_core::styles::charset_to_code_page;
use sheetdata_core::{
    AddressConverter, BiffVersion, FormulaParser, ImportOptions, ImportedSheet, MemorySheet,
    SharedStrings, SheetDataSink, SheetEnv, SheetInfo, StyleLookup, VerbatimFormulaParser,
};

use crate::biff::records;
use crate::biff::strings::{parse_sst, read_byte_string, read_short_string, DEFAULT_CODE_PAGE};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::sheet_data::BiffSheetData;

/// First bytes of every compound file
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// BOUNDSHEET sheet type of worksheets (and dialog sheets)
const SHEET_TYPE_WORKSHEET: u8 = 0;

/// Font and XF information used to pick the code page of byte strings
#[derive(Debug, Clone, Default)]
pub struct WorkbookStyles {
    /// Character set of each FONT record, if the version stores one
    font_charsets: Vec<Option<u8>>,
    /// Font index of each XF record
    xf_fonts: Vec<u16>,
}

impl WorkbookStyles {
    /// Collect FONT and XF records of `version`
    pub fn collect(records: &[BiffRecord], version: BiffVersion) -> Self {
        let mut styles = Self::default();
        for rec in records {
            let mut off = 0;
            match (rec.record_type, version) {
                (records::FONT, BiffVersion::Biff5 | BiffVersion::Biff8) => {
                    // height, flags, color, weight, escapement, underline, family
                    styles.font_charsets.push(rec.data.get(12).copied());
                }
                (records::FONT, _) | (records::BIFF3_FONT, _) => styles.font_charsets.push(None),
                (records::BIFF5_XF, _) => match read_u16(&rec.data, &mut off) {
                    Ok(font) => styles.xf_fonts.push(font),
                    Err(e) => log::warn!("unreadable XF record: {}", e),
                },
                (records::BIFF2_XF | records::BIFF3_XF | records::BIFF4_XF, _) => {
                    match read_u8(&rec.data, &mut off) {
                        Ok(font) => styles.xf_fonts.push(font as u16),
                        Err(e) => log::warn!("unreadable XF record: {}", e),
                    }
                }
                _ => {}
            }
        }
        styles
    }
}

impl StyleLookup for WorkbookStyles {
    fn has_cell_xfs(&self) -> bool {
        !self.xf_fonts.is_empty()
    }

    fn font_code_page(&self, xf_id: u32) -> Option<u16> {
        let font = *self.xf_fonts.get(xf_id as usize)? as usize;
        // Font index 4 is never written; later indexes are shifted by one
        let font = if font >= 4 { font - 1 } else { font };
        self.font_charsets
            .get(font)
            .copied()
            .flatten()
            .and_then(charset_to_code_page)
    }
}

/// Where one worksheet's records live and how to read them
#[derive(Debug)]
struct SheetSource {
    records: Range<usize>,
    styles: WorkbookStyles,
    code_page: u16,
}

/// Metadata for a sheet parsed from the BOUNDSHEET record.
#[derive(Debug)]
struct BoundSheet {
    /// Absolute byte offset of the sheet's BOF in the Workbook stream.
    offset: u32,
    /// Sheet type: 0 = worksheet, 2 = chart, 6 = macro/VBA.
    sheet_type: u8,
    /// Sheet name.
    name: String,
}

/// XLS workbook reader
pub struct XlsReader {
    version: BiffVersion,
    records: Vec<BiffRecord>,
    sheets: Vec<SheetInfo>,
    sources: Vec<SheetSource>,
    shared_strings: SharedStrings,
}

impl XlsReader {
    /// Open a workbook from a file path
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsResult<Self> {
        let file = File::open(path)?;
        Self::open(file)
    }

    /// Open a workbook from any `Read + Seek` source.
    ///
    /// Compound files are recognized by their signature; anything else is
    /// read as a bare BIFF stream.
    pub fn open<R: Read + Seek>(mut reader: R) -> XlsResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes.starts_with(&CFB_SIGNATURE) {
            let stream = Self::read_workbook_stream(bytes)?;
            Self::from_stream(&stream)
        } else {
            Self::from_stream(&bytes)
        }
    }

    /// Read the "Workbook" stream (some files use "Book" for BIFF5)
    fn read_workbook_stream(bytes: Vec<u8>) -> XlsResult<Vec<u8>> {
        let mut cfb = cfb::CompoundFile::open(Cursor::new(bytes))?;
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        cfb.open_stream(stream_path)?.read_to_end(&mut stream_data)?;
        Ok(stream_data)
    }

    /// Parse a BIFF stream: detect the version from the first BOF record,
    /// read the workbook globals and locate the worksheets
    pub fn from_stream(stream: &[u8]) -> XlsResult<Self> {
        let records = biff::read_all_records(stream)?;
        let first = records
            .first()
            .filter(|rec| rec.is_bof())
            .ok_or_else(|| XlsError::InvalidFormat("stream does not start with a BOF record".into()))?;
        let version = BiffVersion::detect(first.record_type, &first.data)?;
        let substreams = biff::split_substreams(&records);

        let mut reader = Self {
            version,
            records: Vec::new(),
            sheets: Vec::new(),
            sources: Vec::new(),
            shared_strings: SharedStrings::default(),
        };
        match version {
            BiffVersion::Biff5 | BiffVersion::Biff8 => {
                reader.locate_bound_sheets(&records, &substreams)?
            }
            _ => reader.locate_single_sheets(&records, &substreams),
        }
        log::debug!(
            "{} workbook with {} worksheet(s)",
            version,
            reader.sheets.len()
        );
        reader.records = records;
        Ok(reader)
    }

    /// BIFF5/BIFF8: the first substream holds the globals; BOUNDSHEET records
    /// name the worksheets and point at their BOF records
    fn locate_bound_sheets(
        &mut self,
        records: &[BiffRecord],
        substreams: &[Range<usize>],
    ) -> XlsResult<()> {
        let globals = substreams
            .first()
            .map(|range| &records[range.clone()])
            .ok_or_else(|| XlsError::InvalidFormat("no workbook globals BOF found".into()))?;

        let code_page = Self::code_page(globals);
        let styles = WorkbookStyles::collect(globals, self.version);
        let mut bound_sheets = Vec::new();

        for rec in globals {
            match rec.record_type {
                records::SST if self.version == BiffVersion::Biff8 => {
                    match parse_sst(&rec.data, &rec.continues) {
                        Ok(strings) => self.shared_strings = strings.into_iter().collect(),
                        Err(e) => log::warn!("unreadable shared string table: {}", e),
                    }
                }
                records::BOUNDSHEET => match self.parse_boundsheet(&rec.data, code_page) {
                    Ok(info) => bound_sheets.push(info),
                    Err(e) => log::warn!("skipping unreadable BOUNDSHEET record: {}", e),
                },
                _ => {}
            }
        }

        for (biff_idx, info) in bound_sheets.into_iter().enumerate() {
            // Only handle worksheets (type 0), skip charts/macros
            if info.sheet_type != SHEET_TYPE_WORKSHEET {
                continue;
            }
            let by_offset = substreams
                .iter()
                .find(|range| records[range.start].stream_offset == info.offset as u64);
            let Some(range) = by_offset.or_else(|| substreams.get(biff_idx + 1)) else {
                log::warn!("no substream for sheet '{}'", info.name);
                continue;
            };
            self.sheets.push(SheetInfo {
                index: self.sheets.len(),
                name: info.name,
            });
            self.sources.push(SheetSource {
                records: range.clone(),
                styles: styles.clone(),
                code_page,
            });
        }
        Ok(())
    }

    /// BIFF2-BIFF4: every worksheet substream carries its own fonts and
    /// formats; sheets have no stored names
    fn locate_single_sheets(&mut self, records: &[BiffRecord], substreams: &[Range<usize>]) {
        for range in substreams {
            let sheet = &records[range.clone()];
            // a BOF without a type field is a worksheet
            if biff::substream_type(&sheet[0]).map_or(false, |dt| dt != records::BOF_WORKSHEET) {
                continue;
            }
            self.sheets.push(SheetInfo {
                index: self.sheets.len(),
                name: format!("Sheet{}", self.sheets.len() + 1),
            });
            self.sources.push(SheetSource {
                records: range.clone(),
                styles: WorkbookStyles::collect(sheet, self.version),
                code_page: Self::code_page(sheet),
            });
        }
    }

    /// The CODEPAGE of `records`, defaulting to Windows-1252.
    ///
    /// BIFF8 declares UTF-16, which only applies to strings that are not
    /// byte strings anyway.
    fn code_page(records: &[BiffRecord]) -> u16 {
        records
            .iter()
            .find(|rec| rec.record_type == records::CODEPAGE)
            .and_then(|rec| read_u16(&rec.data, &mut 0).ok())
            .filter(|&cp| cp != records::CODEPAGE_UTF16)
            .unwrap_or(DEFAULT_CODE_PAGE)
    }

    /// Parse a BOUNDSHEET record body.
    fn parse_boundsheet(&self, data: &[u8], code_page: u16) -> sheetdata_core::Result<BoundSheet> {
        let mut offset = 0;
        let abs_offset = read_u32(data, &mut offset)?;
        let _visibility = read_u8(data, &mut offset)?;
        let sheet_type = read_u8(data, &mut offset)?;
        let name = match self.version {
            BiffVersion::Biff8 => read_short_string(data, &mut offset)?,
            _ => read_byte_string(data, &mut offset, false, code_page)?,
        };

        Ok(BoundSheet {
            offset: abs_offset,
            sheet_type,
            name,
        })
    }

    /// The BIFF version of the workbook
    pub fn version(&self) -> BiffVersion {
        self.version
    }

    /// Worksheets in workbook order
    pub fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    /// The workbook shared-string table (BIFF8 only)
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Decode one worksheet into `sink`
    pub fn decode_sheet<S: SheetDataSink>(
        &self,
        index: usize,
        formulas: &dyn FormulaParser,
        sink: S,
    ) -> XlsResult<S> {
        let source = self
            .sources
            .get(index)
            .ok_or(XlsError::SheetNotFound(index))?;

        let env = SheetEnv::new(
            index as u16,
            AddressConverter::for_biff(self.version),
            formulas,
            &source.styles,
        );
        let mut decoder = BiffSheetData::new(env, self.version, source.code_page, sink);
        biff::decode_records(&self.records[source.records.clone()], &mut decoder)?;
        Ok(decoder.into_sink())
    }

    /// Decode the selected worksheets, each into a fresh sink
    ///
    /// A worksheet that fails to decode is logged and left out.
    pub fn read_sheets<S, F>(
        &self,
        options: &ImportOptions,
        formulas: &dyn FormulaParser,
        mut make_sink: F,
    ) -> XlsResult<Vec<ImportedSheet<S>>>
    where
        S: SheetDataSink,
        F: FnMut(&SheetInfo, &SharedStrings) -> S,
    {
        let mut imported = Vec::new();
        for info in self.sheets.iter().filter(|s| options.selects(s)) {
            let sink = make_sink(info, &self.shared_strings);
            match self.decode_sheet(info.index, formulas, sink) {
                Ok(data) => imported.push(ImportedSheet {
                    info: info.clone(),
                    data,
                }),
                Err(e) => log::warn!("skipping worksheet '{}': {}", info.name, e),
            }
        }
        Ok(imported)
    }

    /// Decode every worksheet into a [`MemorySheet`]
    pub fn read_all(&self) -> XlsResult<Vec<ImportedSheet<MemorySheet>>> {
        self.read_sheets(&ImportOptions::default(), &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
    }
}

/// Decode every worksheet of the file at `path` into memory
pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Vec<ImportedSheet<MemorySheet>>> {
    XlsReader::open_file(path)?.read_all()
}
