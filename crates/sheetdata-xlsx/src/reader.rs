//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use sheetdata_core::{
    AddressConverter, FormulaParser, ImportOptions, ImportedSheet, MemorySheet, NoStyles,
    SharedStrings, SheetDataSink, SheetEnv, SheetInfo, VerbatimFormulaParser,
};

use crate::error::{XlsxError, XlsxResult};
use crate::escapes::decode_excel_escapes;
use crate::sheet_data::SheetDataContext;
use crate::walk::{collect_attributes, decode_xml};

/// XLSX package reader
///
/// Opening the package reads the workbook-global parts (sheet list,
/// relationships, shared strings); worksheets are decoded on demand.
pub struct XlsxReader<R> {
    archive: zip::ZipArchive<R>,
    sheets: Vec<SheetInfo>,
    sheet_paths: Vec<String>,
    shared_strings: SharedStrings,
}

impl XlsxReader<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxReader<R> {
    /// Open a workbook from a reader
    pub fn open(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let rels = Self::read_workbook_rels(&mut archive)?;

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
    ) -> XlsxResult<S> {
        let path = self
            .sheet_paths
            .get(index)
            .ok_or(XlsxError::SheetNotFound(index))?
            .clone();
        let file = self
            .archive
            .by_name(&path)
            .map_err(|_| XlsxError::MissingPart(path.clone()))?;

        let env = SheetEnv::new(
            index as u16,
            AddressConverter::for_ooxml(),
            formulas,
            &NoStyles,
        );
        let mut context = SheetDataContext::new(env, sink);
        decode_xml(BufReader::new(file), &mut context)?;
        Ok(context.into_sink())
    }

    /// Decode the selected worksheets, each into a fresh sink
    ///
    /// A worksheet that fails to decode is logged and left out.
    pub fn read_sheets<S, F>(
        &mut self,
        options: &ImportOptions,
        formulas: &dyn FormulaParser,
        mut make_sink: F,
    ) -> XlsxResult<Vec<ImportedSheet<S>>>
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
    pub fn read_all(&mut self) -> XlsxResult<Vec<ImportedSheet<MemorySheet>>> {
        self.read_sheets(&ImportOptions::default(), &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
    }

    /// Read the shared strings table
    ///
    /// Rich runs are flattened to their text; phonetic runs are dropped.
    fn read_shared_strings(archive: &mut zip::ZipArchive<R>) -> XlsxResult<SharedStrings> {
        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(SharedStrings::default()), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut strings = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut phonetic_depth = 0usize;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_si && phonetic_depth == 0 => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings.into_iter().collect())
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                    let attrs = collect_attributes(&e);
                    // `r:id` arrives by its local name
                    if let (Some(name), Some(r_id)) = (attrs.get("name"), attrs.get("id")) {
                        sheets.push((name.to_string(), r_id.to_string()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths
    fn read_workbook_rels(archive: &mut zip::ZipArchive<R>) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let attrs = collect_attributes(&e);
                    if let (Some(id), Some(target), Some(rel_type)) =
                        (attrs.get("Id"), attrs.get("Target"), attrs.get("Type"))
                    {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id.to_string(), full_path);
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
pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<ImportedSheet<MemorySheet>>> {
    XlsxReader::open_file(path)?.read_all()
}
