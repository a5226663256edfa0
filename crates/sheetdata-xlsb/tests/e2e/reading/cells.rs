//! Rows and cell values through a full package read.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{CellAddress, CellContent, CellError, ImportOptions, MemorySheet, ValueRange};
use sheetdata_xlsb::{read_file, records, XlsbReader};

use crate::{build_xlsb, temp_file, SheetBuilder};

fn content(sheet: &MemorySheet, a1: &str) -> Option<CellContent> {
    sheet
        .cell(CellAddress::parse(a1).unwrap())
        .map(|c| c.content.clone())
}

fn values_sheet() -> Vec<u8> {
    let mut b = SheetBuilder::new();
    b.row(0, 300, 0, &[(0, 6)]);
    b.i32(0).u32(0).f64(42.5).record(records::CELL_DOUBLE);
    b.i32(1).u32(0).i32(1).record(records::CELL_SI);
    b.i32(2).u32(0).u8(0).record(records::CELL_BOOL);
    b.i32(3).u32(0).u8(0x17).record(records::CELL_ERROR);
    b.i32(4).u32(0).wide("inline").record(records::CELL_STRING);
    b.u32(5).u32((7 << 2) | 0x02).record(records::MULTCELL_RK);
    b.u32(0).record(records::MULTCELL_BLANK);
    b.finish()
}

#[test]
fn test_values_of_every_type() {
    let bytes = build_xlsb(&[("Values", values_sheet())], &["zero", "one"]);
    let sheets = XlsbReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    let sheet = &sheets[0].data;

    assert_eq!(content(sheet, "A1"), Some(CellContent::Number(42.5)));
    assert_eq!(content(sheet, "B1"), Some(CellContent::Text("one".into())));
    assert_eq!(content(sheet, "C1"), Some(CellContent::Boolean(false)));
    assert_eq!(content(sheet, "D1"), Some(CellContent::Error(CellError::Ref)));
    assert_eq!(content(sheet, "E1"), Some(CellContent::Text("inline".into())));
    assert_eq!(content(sheet, "F1"), Some(CellContent::Number(7.0)));
    assert_eq!(content(sheet, "G1"), Some(CellContent::Blank));
    assert_eq!(
        sheet.cell(CellAddress::parse("F1").unwrap()).unwrap().xf_id,
        Some(5)
    );
    assert_eq!(
        sheet.used_area().map(|r| r.to_a1_string()),
        Some("A1:G1".to_string())
    );
}

#[test]
fn test_row_properties() {
    let mut b = SheetBuilder::new();
    b.row(4, 400, 0x0100 | 0x0800 | 0x2000, &[(2, 3), (0, 0)]);
    b.row(5, 255, 0, &[]);
    let bytes = build_xlsb(&[("Rows", b.finish())], &[]);

    let sheets = XlsbReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    let sheet = &sheets[0].data;

    let row5 = sheet.row(5).unwrap();
    assert_eq!(row5.height, 20.0);
    assert_eq!(row5.level, 1);
    assert!(row5.collapsed);
    assert!(row5.custom_height);
    assert_eq!(
        row5.col_spans(),
        &[ValueRange::new(0, 0), ValueRange::new(2, 3)]
    );
    assert!(sheet.row(6).unwrap().col_spans().is_empty());
    assert_eq!(sheet.cell_count(), 0);
}

#[test]
fn test_sheet_selection_by_name() {
    let mut first = SheetBuilder::new();
    first.row(0, 300, 0, &[]);
    first.i32(0).u32(0).f64(1.0).record(records::CELL_DOUBLE);
    let mut second = SheetBuilder::new();
    second.row(0, 300, 0, &[]);
    second.i32(0).u32(0).f64(2.0).record(records::CELL_DOUBLE);
    let bytes = build_xlsb(&[("One", first.finish()), ("Two", second.finish())], &[]);

    let mut reader = XlsbReader::open(Cursor::new(bytes)).unwrap();
    let names: Vec<&str> = reader.sheets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Two"]);

    let sheets = reader
        .read_sheets(
            &ImportOptions::new().sheet_name("Two"),
            &sheetdata_core::VerbatimFormulaParser,
            |_, sst| MemorySheet::with_shared_strings(sst.clone()),
        )
        .unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].info.index, 1);
    assert_eq!(content(&sheets[0].data, "A1"), Some(CellContent::Number(2.0)));
}

#[test]
fn test_read_from_file() {
    let bytes = build_xlsb(&[("Values", values_sheet())], &["zero", "one"]);
    let file = temp_file(&bytes, "xlsb");
    let sheets = read_file(file.path()).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].info.name, "Values");
    assert_eq!(sheets[0].data.cell_count(), 7);
}

#[test]
fn test_torn_sheet_stream_is_skipped() {
    let mut torn = SheetBuilder::new();
    torn.row(0, 300, 0, &[]);
    let mut torn = torn.finish();
    // CELL_DOUBLE header announcing 16 bytes, only 2 present
    torn.extend_from_slice(&[records::CELL_DOUBLE as u8, 16, 0, 0]);

    let bytes = build_xlsb(&[("Torn", torn), ("Values", values_sheet())], &["zero", "one"]);
    let sheets = XlsbReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].info.name, "Values");
    assert_eq!(content(&sheets[0].data, "A1"), Some(CellContent::Number(42.5)));
}
