//! XLSB reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use sheetdata_core::binary::skip;
use sheetdata_core::{
    AddressConverter, FormulaParser, ImportOptions, ImportedSheet, MemorySheet, NoStyles,
    SharedStrings, SheetDataSink, SheetEnv, SheetInfo, VerbatimFormulaParser,
};

use crate::error::{XlsbError, XlsbResult};
use crate::records;
use crate::rich::{read_nullable_wide_string, read_rich_string, read_wide_string};
use crate::sheet_data::BinarySheetData;
use crate::stream::{decode_records, RecordReader};

const WORKBOOK_PART: &str = "xl/workbook.bin";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.bin.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.bin";

/// XLSB package reader
///
/// Opening the package reads the sheet list, the workbook relationships and
/// the shared strings; worksheets are decoded on demand.
pub struct XlsbReader<R> {
    archive: zip::ZipArchive<R>,
    sheets: Vec<SheetInfo>,
    sheet_paths: Vec<String>,
    shared_strings: SharedStrings,
}

impl XlsbReader<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsbResult<Self> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsbReader<R> {
    /// Open a workbook from a reader
    pub fn open(reader: R) -> XlsbResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsbError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let rels = Self::read_workbook_rels(&mut archive)?;
        let sheet_info = Self::read_workbook_sheets(&mut archive)?;
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        let mut sheets = Vec::new();
        let mut sheet_paths = Vec::new();
        for (name, r_id) in sheet_info {
            match rels.get(&r_id) {
                Some(path) => {
                    sheets.push(SheetInfo {
                        index: sheets.len(),
                        name,
                    });
                    sheet_paths.push(path.clone());
                }
                None => log::warn!("sheet '{}' has no worksheet relationship {}", name, r_id),
            }
        }

        Ok(Self {
            archive,
            sheets,
            sheet_paths,
            shared_strings,
        })
    }

    /// Worksheets in workbook order
    pub fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    /// The workbook shared-string table
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Decode one worksheet into `sink`
    pub fn decode_sheet<S: SheetDataSink>(
        &mut self,
        index: usize,
        formulas: &dyn FormulaParser,
        sink: S,
    ) -> XlsbResult<S> {
        let path = self
            .sheet_paths
            .get(index)
            .ok_or(XlsbError::SheetNotFound(index))?
            .clone();
        let file = self
            .archive
            .by_name(&path)
            .map_err(|_| XlsbError::MissingPart(path.clone()))?;

        let env = SheetEnv::new(
            index as u16,
            AddressConverter::for_ooxml(),
            formulas,
            &NoStyles,
        );
        let mut decoder = BinarySheetData::new(env, sink);
        decode_records(file, &mut decoder)?;
        Ok(decoder.into_sink())
    }

    /// Decode the selected worksheets, each into a fresh sink
    ///
    /// A worksheet that fails to decode is logged and left out.
    pub fn read_sheets<S, F>(
        &mut self,
        options: &ImportOptions,
        formulas: &dyn FormulaParser,
        mut make_sink: F,
    ) -> XlsbResult<Vec<ImportedSheet<S>>>
    where
        S: SheetDataSink,
        F: FnMut(&SheetInfo, &SharedStrings) -> S,
    {
        let selected: Vec<SheetInfo> = self
            .sheets
            .iter()
            .filter(|s| options.selects(s))
            .cloned()
            .collect();

        let mut imported = Vec::with_capacity(selected.len());
        for info in selected {
            let sink = make_sink(&info, &self.shared_strings);
            match self.decode_sheet(info.index, formulas, sink) {
                Ok(data) => imported.push(ImportedSheet { info, data }),
                Err(e) => log::warn!("skipping worksheet '{}': {}", info.name, e),
            }
        }
        Ok(imported)
    }

    /// Decode every worksheet into a [`MemorySheet`]
    pub fn read_all(&mut self) -> XlsbResult<Vec<ImportedSheet<MemorySheet>>> {
        self.read_sheets(&ImportOptions::default(), &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
    }

    /// Read the sheet list of workbook.bin as (name, relationship id) pairs
    fn read_workbook_sheets(archive: &mut zip::ZipArchive<R>) -> XlsbResult<Vec<(String, String)>> {
        let file = archive
            .by_name(WORKBOOK_PART)
            .map_err(|_| XlsbError::MissingPart(WORKBOOK_PART.into()))?;

        let mut reader = RecordReader::new(file);
        let mut sheets = Vec::new();
        while let Some((id, data)) = reader.next_record()? {
            match id {
                records::SHEET => {
                    let mut off = 0;
                    // state flags, sheet id
                    skip(data, &mut off, 8)?;
                    let r_id = read_nullable_wide_string(data, &mut off)?.unwrap_or_default();
                    let name = read_wide_string(data, &mut off)?;
                    sheets.push((name, r_id));
                }
                records::SHEETS_END => break,
                _ => {}
            }
        }
        Ok(sheets)
    }

    /// Read the shared strings table; formatting runs are flattened
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsbResult<SharedStrings> {
        let file = match archive.by_name(SHARED_STRINGS_PART) {
            Ok(f) => f,
            Err(_) => return Ok(SharedStrings::default()),
        };

        let mut reader = RecordReader::new(file);
        let mut strings = Vec::new();
        while let Some((id, data)) = reader.next_record()? {
            match id {
                records::SST_ITEM => {
                    let mut off = 0;
                    match read_rich_string(data, &mut off) {
                        Ok(rich) => strings.push(rich.text()),
                        Err(e) => {
                            log::warn!("unreadable shared string {}: {}", strings.len(), e);
                            strings.push(String::new());
                        }
                    }
                }
                records::SST_END => break,
                _ => {}
            }
        }
        Ok(strings.into_iter().collect())
    }

    /// Read workbook.bin.rels to get worksheet part paths
    fn read_workbook_rels(archive: &mut zip::ZipArchive<R>) -> XlsbResult<HashMap<String, String>> {
        let file = archive
            .by_name(WORKBOOK_RELS_PART)
            .map_err(|_| XlsbError::MissingPart(WORKBOOK_RELS_PART.into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;
                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = Some(value),
                            b"Target" => target = Some(value),
                            b"Type" => rel_type = Some(value),
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }
}

/// Decode every worksheet of the file at `path` into memory
pub fn read_file<P: AsRef<Path>>(path: P) -> XlsbResult<Vec<ImportedSheet<MemorySheet>>> {
    XlsbReader::open_file(path)?.read_all()
}
