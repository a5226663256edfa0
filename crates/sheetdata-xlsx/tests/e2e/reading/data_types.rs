//! Cell value decoding through a full package read.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{CellAddress, CellContent, CellError};
use sheetdata_xlsx::{read_file, XlsxReader};

use crate::{build_xlsx, temp_file, worksheet};

fn content(sheet: &sheetdata_core::MemorySheet, a1: &str) -> Option<CellContent> {
    sheet
        .cell(CellAddress::parse(a1).unwrap())
        .map(|c| c.content.clone())
}

#[test]
fn test_values_of_every_type() {
    let xml = worksheet(
        r#"<row r="1" spans="1:7">
  <c r="A1"><v>42</v></c>
  <c r="B1" t="s"><v>1</v></c>
  <c r="C1" t="b"><v>0</v></c>
  <c r="D1" t="e"><v>#REF!</v></c>
  <c r="E1" t="str"><v>tab_x0009_here</v></c>
  <c r="F1" t="inlineStr"><is><t>inline</t></is></c>
  <c r="G1" s="2"/>
</row>"#,
    );
    let bytes = build_xlsx(&[("Types", xml)], &["zero", "one"]);
    let sheets = XlsxReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    let sheet = &sheets[0].data;

    assert_eq!(content(sheet, "A1"), Some(CellContent::Number(42.0)));
    assert_eq!(content(sheet, "B1"), Some(CellContent::Text("one".into())));
    assert_eq!(content(sheet, "C1"), Some(CellContent::Boolean(false)));
    assert_eq!(content(sheet, "D1"), Some(CellContent::Error(CellError::Ref)));
    assert_eq!(content(sheet, "E1"), Some(CellContent::Text("tab\there".into())));
    assert_eq!(content(sheet, "F1"), Some(CellContent::Text("inline".into())));
    assert_eq!(content(sheet, "G1"), Some(CellContent::Blank));
    assert_eq!(sheet.cell(CellAddress::parse("G1").unwrap()).unwrap().xf_id, Some(2));
}

#[test]
fn test_dates_and_bad_dates() {
    let xml = worksheet(
        r#"<row r="1"><c r="A1" t="d"><v>2023-06-30</v></c><c r="B1" t="d"><v>30/06/2023</v></c></row>"#,
    );
    let bytes = build_xlsx(&[("Dates", xml)], &[]);
    let file = temp_file(&bytes, "xlsx");
    let sheets = read_file(file.path()).unwrap();
    let sheet = &sheets[0].data;

    match content(sheet, "A1") {
        Some(CellContent::DateTime(dt)) => assert_eq!(dt.to_string(), "2023-06-30 00:00:00"),
        other => panic!("expected a date, got {:?}", other),
    }
    assert_eq!(
        content(sheet, "B1"),
        Some(CellContent::ErrorText("30/06/2023".into()))
    );
}

#[test]
fn test_bad_shared_string_index_is_blank() {
    let xml = worksheet(r#"<row r="1"><c r="A1" t="s"><v>5</v></c></row>"#);
    let bytes = build_xlsx(&[("S", xml)], &["only"]);
    let sheets = XlsxReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(content(&sheets[0].data, "A1"), Some(CellContent::Blank));
}
