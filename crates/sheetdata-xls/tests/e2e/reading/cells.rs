//! Rows and cell values through a full workbook read.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{
    CellAddress, CellContent, CellError, ImportOptions, MemorySheet, ValueRange,
    VerbatimFormulaParser,
};
use sheetdata_xls::biff::records;
use sheetdata_xls::{read_file, XlsReader};

use crate::{
    biff8_sheet, build_biff8_stream, build_biff8_stream_with_sst, compound_file, temp_file,
    StreamBuilder,
};

fn content(sheet: &MemorySheet, a1: &str) -> Option<CellContent> {
    sheet
        .cell(CellAddress::parse(a1).unwrap())
        .map(|c| c.content.clone())
}

fn values_sheet() -> Vec<u8> {
    biff8_sheet(|b| {
        b.u16(0).u16(0).u16(7).u16(300).u32(0).u32(0x0040).record(records::BIFF3_ROW);
        b.cell(0, 0, 0).f64(42.5).record(records::BIFF3_NUMBER);
        b.cell(0, 1, 0).u32(1).record(records::LABELSST);
        b.cell(0, 2, 0).u8(0).u8(0).record(records::BIFF3_BOOLERR);
        b.cell(0, 3, 0).u8(0x17).u8(1).record(records::BIFF3_BOOLERR);
        b.cell(0, 4, 0).unicode("inline").record(records::BIFF3_LABEL);
        b.u16(0)
            .u16(5)
            .u16(5)
            .u32((7 << 2) | 0x02)
            .u16(0)
            .u32(0x3FF0_0000)
            .u16(6)
            .record(records::MULRK);
        b.u16(1).u16(0).u16(0).u16(0).u16(1).record(records::MULBLANK);
    })
}

#[test]
fn test_values_of_every_type() {
    let stream = build_biff8_stream(&[("Values", values_sheet())], &["zero", "one"]);
    let reader = XlsReader::open(Cursor::new(compound_file("/Workbook", &stream))).unwrap();
    assert_eq!(reader.shared_strings().len(), 2);

    let sheets = reader.read_all().unwrap();
    let sheet = &sheets[0].data;

    assert_eq!(sheets[0].info.name, "Values");
    assert_eq!(content(sheet, "A1"), Some(CellContent::Number(42.5)));
    assert_eq!(content(sheet, "B1"), Some(CellContent::Text("one".into())));
    assert_eq!(content(sheet, "C1"), Some(CellContent::Boolean(false)));
    assert_eq!(content(sheet, "D1"), Some(CellContent::Error(CellError::Ref)));
    assert_eq!(content(sheet, "E1"), Some(CellContent::Text("inline".into())));
    assert_eq!(content(sheet, "F1"), Some(CellContent::Number(7.0)));
    assert_eq!(content(sheet, "G1"), Some(CellContent::Number(1.0)));
    assert_eq!(content(sheet, "A2"), Some(CellContent::Blank));
    assert_eq!(
        sheet.cell(CellAddress::parse("F1").unwrap()).unwrap().xf_id,
        Some(5)
    );
    assert_eq!(
        sheet.used_area().map(|r| r.to_a1_string()),
        Some("A1:G2".to_string())
    );

    let row = sheet.row(1).unwrap();
    assert_eq!(row.height, 15.0);
    assert!(row.custom_height);
    assert_eq!(row.col_spans(), &[ValueRange::new(0, 6)]);
}

#[test]
fn test_sheet_selection_by_name() {
    let first = biff8_sheet(|b| {
        b.cell(0, 0, 0).f64(1.0).record(records::BIFF3_NUMBER);
    });
    let second = biff8_sheet(|b| {
        b.cell(0, 0, 0).f64(2.0).record(records::BIFF3_NUMBER);
    });
    let stream = build_biff8_stream(&[("First", first), ("Second", second)], &[]);
    let reader = XlsReader::open(Cursor::new(compound_file("/Workbook", &stream))).unwrap();
    assert_eq!(
        reader
            .sheets()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>(),
        vec!["First", "Second"]
    );

    let options = ImportOptions::new().sheet_name("second");
    let sheets = reader
        .read_sheets(&options, &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
        .unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].info.index, 1);
    assert_eq!(content(&sheets[0].data, "A1"), Some(CellContent::Number(2.0)));
}

#[test]
fn test_shared_strings_across_continue() {
    let sheet = biff8_sheet(|b| {
        b.cell(0, 0, 0).u32(0).record(records::LABELSST);
    });
    // the only string is split by a CONTINUE record that switches to UTF-16
    let mut sst = StreamBuilder::new();
    sst.u32(1).u32(1).u16(6).u8(0).bytes(b"abc").record(records::SST);
    sst.u8(1).bytes(&[b'd', 0, b'e', 0, b'f', 0]).record(records::CONTINUE);
    let stream = build_biff8_stream_with_sst(&[("S", sheet)], &sst.take());

    let reader = XlsReader::open(Cursor::new(compound_file("/Workbook", &stream))).unwrap();
    let sheets = reader.read_all().unwrap();
    assert_eq!(content(&sheets[0].data, "A1"), Some(CellContent::Text("abcdef".into())));
}

#[test]
fn test_biff5_book_stream() {
    let mut globals = StreamBuilder::new();
    globals.bof(0x0500, 0x0005);
    globals.u16(1251).record(records::CODEPAGE);
    let boundsheet_at = globals.len() + 4;
    globals
        .u32(0)
        .u8(0)
        .u8(0)
        .u8(4)
        .bytes(&[0xCB, 0xE8, 0xF1, 0xF2])
        .record(records::BOUNDSHEET);
    let mut stream = globals.finish();

    let offset = stream.len() as u32;
    stream[boundsheet_at..boundsheet_at + 4].copy_from_slice(&offset.to_le_bytes());
    let mut sheet = StreamBuilder::new();
    sheet.bof(0x0500, 0x0010);
    sheet
        .cell(2, 1, 0)
        .u16(3)
        .bytes(&[0xC4, 0xE0, 0x21])
        .record(records::BIFF3_LABEL);
    stream.extend(sheet.finish());

    let reader = XlsReader::open(Cursor::new(compound_file("/Book", &stream))).unwrap();
    assert_eq!(reader.version(), sheetdata_core::BiffVersion::Biff5);
    assert_eq!(reader.sheets()[0].name, "Лист");

    let sheets = reader.read_all().unwrap();
    assert_eq!(content(&sheets[0].data, "B3"), Some(CellContent::Text("Да!".into())));
}

#[test]
fn test_read_from_file() {
    let stream = build_biff8_stream(&[("Values", values_sheet())], &["zero", "one"]);
    let file = temp_file(&compound_file("/Workbook", &stream), "xls");
    let sheets = read_file(file.path()).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].data.cell_count(), 9);
}

#[test]
fn test_compound_file_without_workbook_stream() {
    let bytes = compound_file("/Other", &[0; 16]);
    assert!(XlsReader::open(Cursor::new(bytes)).is_err());
}
