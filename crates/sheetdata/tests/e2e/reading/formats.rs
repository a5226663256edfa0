//! The same worksheet read from each container format.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata::{
    CellAddress, CellContent, Error, Format, ImportOptions, MemorySheet, RecordingSink,
    VerbatimFormulaParser, Workbook,
};

use crate::{temp_file, xls_stream, xls_workbook, xlsb_workbook, xlsx_workbook};

fn content(sheet: &MemorySheet, a1: &str) -> Option<CellContent> {
    sheet
        .cell(CellAddress::parse(a1).unwrap())
        .map(|c| c.content.clone())
}

fn assert_data_sheet(sheet: &MemorySheet) {
    assert_eq!(content(sheet, "A1"), Some(CellContent::Number(42.0)));
    assert_eq!(content(sheet, "B1"), Some(CellContent::Text("hello".into())));
    assert_eq!(sheet.cell_count(), 2);
}

#[test]
fn test_every_format_reads_alike() {
    for (bytes, format) in [
        (xlsx_workbook(), Format::Xlsx),
        (xlsb_workbook(), Format::Xlsb),
        (xls_workbook(), Format::Xls),
        (xls_stream(), Format::Xls),
    ] {
        let mut workbook = Workbook::open(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.format(), format);
        assert_eq!(workbook.sheets().len(), 1);
        assert_eq!(workbook.sheets()[0].name, "Data");

        let sheets = workbook.read_all().unwrap();
        assert_data_sheet(&sheets[0].data);
    }
}

#[test]
fn test_open_by_path() {
    // the extension is not consulted
    let file = temp_file(&xlsb_workbook(), "xlsx");
    let sheets = sheetdata::open(file.path()).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_data_sheet(&sheets[0].data);
}

#[test]
fn test_open_with_sheet_selection() {
    let file = temp_file(&xls_workbook(), "xls");
    let sheets = sheetdata::open_with(file.path(), &ImportOptions::new().sheet_name("data")).unwrap();
    assert_eq!(sheets.len(), 1);

    let none = sheetdata::open_with(file.path(), &ImportOptions::new().sheet_name("Other")).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_decode_sheet_into_custom_sink() {
    let mut workbook = Workbook::from_bytes(xlsx_workbook()).unwrap();
    let sink = workbook
        .decode_sheet(0, &VerbatimFormulaParser, RecordingSink::new())
        .unwrap();
    assert_eq!(sink.cell_calls().count(), 2);

    assert!(workbook
        .decode_sheet(3, &VerbatimFormulaParser, RecordingSink::new())
        .is_err());
}

#[test]
fn test_unknown_format() {
    let result = Workbook::from_bytes(b"name,value\nA,1\n".to_vec());
    assert!(matches!(result, Err(Error::UnknownFormat)));

    let file = temp_file(b"", "xlsx");
    assert!(matches!(sheetdata::open(file.path()), Err(Error::UnknownFormat)));
}
