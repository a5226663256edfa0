//! Common utilities for E2E tests: one small workbook per format, each
//! holding the number 42 in A1 and the text "hello" in B1 of a sheet named
//! "Data".

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;

/// Build an XLSX package
pub fn xlsx_workbook() -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><v>42</v></c><c r="B1" t="inlineStr"><is><t>hello</t></is></c></row></sheetData></worksheet>"#,
            ),
        ];
        for (name, xml) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn wide(out: &mut Vec<u8>, text: &str) {
    let units: Vec<u16> = text.encode_utf16().collect();
    out.extend((units.len() as u32).to_le_bytes());
    for u in units {
        out.extend(u.to_le_bytes());
    }
}

/// Build an XLSB package
pub fn xlsb_workbook() -> Vec<u8> {
    use sheetdata_xlsb::records;
    use sheetdata_xlsb::stream::write_record;

    let mut sheet_entry = Vec::new();
    sheet_entry.extend(0u32.to_le_bytes());
    sheet_entry.extend(1u32.to_le_bytes());
    wide(&mut sheet_entry, "rId1");
    wide(&mut sheet_entry, "Data");
    let mut workbook = Vec::new();
    write_record(&mut workbook, records::SHEET, &sheet_entry).unwrap();
    write_record(&mut workbook, records::SHEETS_END, &[]).unwrap();

    let mut row = Vec::new();
    row.extend(0i32.to_le_bytes());
    row.extend([0; 9]);
    row.extend(0i32.to_le_bytes());
    let mut number = Vec::new();
    number.extend(0i32.to_le_bytes());
    number.extend([0; 4]);
    number.extend(42.0f64.to_le_bytes());
    let mut text = Vec::new();
    text.extend(1i32.to_le_bytes());
    text.extend([0; 4]);
    wide(&mut text, "hello");

    let mut sheet = Vec::new();
    write_record(&mut sheet, records::SHEETDATA, &[]).unwrap();
    write_record(&mut sheet, records::ROW, &row).unwrap();
    write_record(&mut sheet, records::CELL_DOUBLE, &number).unwrap();
    write_record(&mut sheet, records::CELL_STRING, &text).unwrap();
    write_record(&mut sheet, records::SHEETDATA_END, &[]).unwrap();

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();
        zip.start_file("xl/workbook.bin", options).unwrap();
        zip.write_all(&workbook).unwrap();
        zip.start_file("xl/_rels/workbook.bin.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.bin"/></Relationships>"#).unwrap();
        zip.start_file("xl/worksheets/sheet1.bin", options).unwrap();
        zip.write_all(&sheet).unwrap();
        zip.finish().unwrap();
    }
    buf
}

fn biff_record(out: &mut Vec<u8>, id: u16, body: &[u8]) {
    out.extend(id.to_le_bytes());
    out.extend((body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
}

fn biff8_bof(out: &mut Vec<u8>, substream: u16) {
    let mut body = vec![0x00, 0x06];
    body.extend(substream.to_le_bytes());
    body.extend([0; 12]);
    biff_record(out, 0x0809, &body);
}

/// Build a BIFF8 workbook stream
pub fn xls_stream() -> Vec<u8> {
    use sheetdata_xls::biff::records;

    let mut globals = Vec::new();
    biff8_bof(&mut globals, 0x0005);
    let offset_field = globals.len() + 4;
    biff_record(&mut globals, records::BOUNDSHEET, &[0, 0, 0, 0, 0, 0, 4, 0, b'D', b'a', b't', b'a']);
    biff_record(&mut globals, records::EOF, &[]);

    let sheet_offset = (globals.len() as u32).to_le_bytes();
    globals[offset_field..offset_field + 4].copy_from_slice(&sheet_offset);

    let mut stream = globals;
    biff8_bof(&mut stream, 0x0010);
    let mut number = vec![0, 0, 0, 0, 0, 0];
    number.extend(42.0f64.to_le_bytes());
    biff_record(&mut stream, records::BIFF3_NUMBER, &number);
    biff_record(&mut stream, records::BIFF3_LABEL, &[0, 0, 1, 0, 0, 0, 5, 0, 0, b'h', b'e', b'l', b'l', b'o']);
    biff_record(&mut stream, records::EOF, &[]);
    stream
}

/// Wrap the BIFF8 stream in a compound file
pub fn xls_workbook() -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut s = comp.create_stream("/Workbook").unwrap();
        s.write_all(&xls_stream()).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
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
