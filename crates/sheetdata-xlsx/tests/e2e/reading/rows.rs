//! Row models, implicit addressing and the used area.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{
    CellAddress, CellRange, ImportOptions, MemorySheet, RecordingSink, SinkCall, ValueRange,
    VerbatimFormulaParser,
};
use sheetdata_xlsx::XlsxReader;

use crate::{build_xlsx, worksheet};

#[test]
fn test_rows_and_implicit_cells() {
    let xml = worksheet(
        r#"<row r="2" spans="2:4" ht="30" customHeight="1"><c r="B2"><v>1</v></c><c><v>2</v></c><c><v>3</v></c></row><row><c><v>4</v></c></row>"#,
    );
    let bytes = build_xlsx(&[("Rows", xml)], &[]);
    let sheets = XlsxReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    let sheet = &sheets[0].data;

    let row2 = sheet.row(2).unwrap();
    assert_eq!(row2.height, 30.0);
    assert!(row2.custom_height);
    assert_eq!(row2.col_spans(), &[ValueRange::new(1, 3)]);
    assert!(sheet.row(3).is_some());

    let addresses: Vec<String> = sheet.cells().map(|(a, _)| a.to_string()).collect();
    assert_eq!(addresses, vec!["B2", "C2", "D2", "A3"]);
    assert_eq!(sheet.used_area(), Some(CellRange::parse("A2:D3").unwrap()));
}

#[test]
fn test_sheet_selection_and_recording() {
    let first = worksheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#);
    let second = worksheet(r#"<row r="1"><c r="C1"><v>2</v></c></row>"#);
    let bytes = build_xlsx(&[("One", first), ("Two", second)], &[]);
    let mut reader = XlsxReader::open(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.sheets().len(), 2);

    let options = ImportOptions::new().sheet_name("Two");
    let imported = reader
        .read_sheets(&options, &VerbatimFormulaParser, |_, _| RecordingSink::new())
        .unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].info.index, 1);

    let calls = &imported[0].data.calls;
    assert!(matches!(calls[0], SinkCall::RowModel(_)));
    assert_eq!(calls[1], SinkCall::ExtendUsedArea(CellAddress::new(0, 2)));

    let options = ImportOptions::new().sheet_index(0);
    let imported = reader
        .read_sheets(&options, &VerbatimFormulaParser, |_, sst| {
            MemorySheet::with_shared_strings(sst.clone())
        })
        .unwrap();
    assert_eq!(imported[0].info.name, "One");
    assert_eq!(imported[0].data.cell_count(), 1);
}

#[test]
fn test_corrupt_sheet_does_not_affect_others() {
    let first = worksheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#);
    let broken = worksheet(r#"<row r="1"><c r="A1"><v>2</v></c></row></bogus>"#);
    let last = worksheet(r#"<row r="2"><c r="B2"><v>3</v></c></row>"#);
    let bytes = build_xlsx(&[("Good", first), ("Bad", broken), ("Last", last)], &[]);
    let mut reader = XlsxReader::open(Cursor::new(bytes)).unwrap();

    assert!(reader
        .decode_sheet(1, &VerbatimFormulaParser, MemorySheet::new())
        .is_err());

    let imported = reader.read_all().unwrap();
    let names: Vec<&str> = imported.iter().map(|s| s.info.name.as_str()).collect();
    assert_eq!(names, vec!["Good", "Last"]);
    assert_eq!(imported[0].data.cell_count(), 1);
    assert_eq!(imported[1].data.cell_count(), 1);
}
