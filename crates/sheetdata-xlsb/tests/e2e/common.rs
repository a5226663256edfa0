//! Common utilities for E2E tests.

use std::io::{Cursor, Write};

use sheetdata_xlsb::records;
use sheetdata_xlsb::stream::write_record;
use tempfile::NamedTempFile;

/// Assembles a worksheet record stream
#[derive(Default)]
pub struct SheetBuilder {
    bytes: Vec<u8>,
    body: Vec<u8>,
}

impl SheetBuilder {
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.record(records::SHEETDATA);
        builder
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.body.push(v);
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn wide(&mut self, text: &str) -> &mut Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.u32(units.len() as u32);
        for u in units {
            self.u16(u);
        }
        self
    }

    /// Formula flags and an rgce without extra data
    pub fn formula(&mut self, rgce: &[u8]) -> &mut Self {
        self.u16(0).u32(rgce.len() as u32);
        self.body.extend_from_slice(rgce);
        self.u32(0)
    }

    /// Emit the fields collected so far as one record
    pub fn record(&mut self, id: u32) -> &mut Self {
        write_record(&mut self.bytes, id, &self.body).unwrap();
        self.body.clear();
        self
    }

    /// Row header (0-based index, height in twips) followed by `spans`
    pub fn row(&mut self, index: i32, height: u16, flags: u16, spans: &[(i32, i32)]) -> &mut Self {
        self.i32(index)
            .u32(0)
            .u16(height)
            .u16(flags)
            .u8(0)
            .i32(spans.len() as i32);
        for &(first, last) in spans {
            self.i32(first).i32(last);
        }
        self.record(records::ROW)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        self.record(records::SHEETDATA_END);
        std::mem::take(&mut self.bytes)
    }
}

fn rich_string(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = vec![0u8];
    out.extend((units.len() as u32).to_le_bytes());
    for u in units {
        out.extend(u.to_le_bytes());
    }
    out
}

/// Build an XLSB package holding `sheets` (name, worksheet records) and a
/// shared-string table.
pub fn build_xlsb(sheets: &[(&str, Vec<u8>)], shared_strings: &[&str]) -> Vec<u8> {
    let mut workbook = Vec::new();
    let mut rels = String::from(
        r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        let mut sheet = Vec::new();
        sheet.extend(0u32.to_le_bytes());
        sheet.extend((i as u32 + 1).to_le_bytes());
        for text in [format!("rId{}", i + 1), name.to_string()] {
            let units: Vec<u16> = text.encode_utf16().collect();
            sheet.extend((units.len() as u32).to_le_bytes());
            for u in units {
                sheet.extend(u.to_le_bytes());
            }
        }
        write_record(&mut workbook, records::SHEET, &sheet).unwrap();
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.bin"/>"#,
            i + 1,
            i + 1
        ));
    }
    write_record(&mut workbook, records::SHEETS_END, &[]).unwrap();
    rels.push_str("</Relationships>");

    let mut sst = Vec::new();
    let count = (shared_strings.len() as u32).to_le_bytes();
    write_record(&mut sst, records::SST, &[count, count].concat()).unwrap();
    for s in shared_strings {
        write_record(&mut sst, records::SST_ITEM, &rich_string(s)).unwrap();
    }
    write_record(&mut sst, records::SST_END, &[]).unwrap();

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="bin" ContentType="application/vnd.ms-excel.sheet.binary.macroEnabled.main"/></Types>"#).unwrap();
        zip.start_file("xl/workbook.bin", options).unwrap();
        zip.write_all(&workbook).unwrap();
        zip.start_file("xl/_rels/workbook.bin.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        zip.start_file("xl/sharedStrings.bin", options).unwrap();
        zip.write_all(&sst).unwrap();
        for (i, (_, data)) in sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.bin", i + 1), options)
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

/// Save `bytes` to a temp file with the given extension
pub fn temp_file(bytes: &[u8], extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
