//! BIFF2-BIFF4 files: bare record streams without a compound file.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{BiffVersion, CellAddress, CellContent, TableData};
use sheetdata_xls::biff::records;
use sheetdata_xls::XlsReader;

use crate::StreamBuilder;

fn at(a1: &str) -> CellAddress {
    CellAddress::parse(a1).unwrap()
}

/// BIFF2 worksheet with an XF table: fonts, XFs, then cells
fn biff2_stream() -> Vec<u8> {
    let mut b = StreamBuilder::new();
    b.u16(0x0002).u16(0x0010).record(0x0009);
    b.u16(200).u16(0).u8(5).bytes(b"Arial").record(records::FONT);
    b.u8(0).u8(0).u8(0).u8(0).record(records::BIFF2_XF);
    b.u8(0).u8(0).u8(0).u8(0).record(records::BIFF2_XF);

    // row 0 spans columns 0-2, formatted with XF 1
    b.u16(0)
        .u16(0)
        .u16(3)
        .u16(255)
        .u16(0)
        .u8(1)
        .bytes(&[0; 5])
        .u16(1)
        .record(records::BIFF2_ROW);
    b.u16(0).u16(0).bytes(&[1, 0, 0]).u16(12).record(records::BIFF2_INTEGER);
    b.u16(70).record(records::IXFE);
    b.u16(0)
        .u16(1)
        .bytes(&[63, 0, 0])
        .f64(0.25)
        .record(records::BIFF2_NUMBER);
    b.u16(0)
        .u16(2)
        .bytes(&[0, 0, 0])
        .u8(4)
        .bytes(b"text")
        .record(records::BIFF2_LABEL);
    b.u16(1).u16(0).bytes(&[0, 0, 0]).u8(1).u8(0).record(records::BIFF2_BOOLERR);

    // one-dimensional data table over A3:B5 anchored at a blank A3
    b.u16(2).u16(0).bytes(&[0, 0, 0]).record(records::BIFF2_BLANK);
    b.u16(2)
        .u16(4)
        .u8(0)
        .u8(1)
        .u8(0)
        .u8(1)
        .u16(0)
        .u16(3)
        .record(records::BIFF2_DATATABLE);
    b.finish()
}

#[test]
fn test_biff2_worksheet() {
    let reader = XlsReader::open(Cursor::new(biff2_stream())).unwrap();
    assert_eq!(reader.version(), BiffVersion::Biff2);
    assert_eq!(reader.sheets().len(), 1);

    let sheets = reader.read_all().unwrap();
    let sheet = &sheets[0].data;

    let a1 = sheet.cell(at("A1")).unwrap();
    assert_eq!(a1.content, CellContent::Number(12.0));
    assert_eq!(a1.xf_id, Some(1));
    let b1 = sheet.cell(at("B1")).unwrap();
    assert_eq!(b1.content, CellContent::Number(0.25));
    assert_eq!(b1.xf_id, Some(70));
    assert_eq!(sheet.cell(at("C1")).unwrap().content, CellContent::Text("text".into()));
    assert_eq!(sheet.cell(at("A2")).unwrap().content, CellContent::Boolean(true));
    assert!(sheet.cells().all(|(_, c)| c.inline_format.is_none()));

    let row = sheet.row(1).unwrap();
    assert_eq!(row.xf_id, Some(1));
    assert!(row.custom_format);

    let tables = sheet.table_operations();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].0.to_a1_string(), "A3:B5");
    assert_eq!(
        tables[0].1,
        TableData {
            ref1: "D1".into(),
            row_table: true,
            ..TableData::default()
        }
    );
}

#[test]
fn test_biff3_and_biff4_formula_records() {
    for (bof, formula_id, version) in [
        (0x0209u16, records::BIFF3_FORMULA, BiffVersion::Biff3),
        (0x0409u16, records::BIFF4_FORMULA, BiffVersion::Biff4),
    ] {
        let mut b = StreamBuilder::new();
        b.u16(0).u16(0x0010).u16(0).record(bof);
        b.u16(0)
            .u16(0)
            .u16(0)
            .f64(5.0)
            .u16(0)
            .u16(1)
            .u8(0x1E)
            .record(formula_id);
        let stream = b.finish();

        let reader = XlsReader::open(Cursor::new(stream)).unwrap();
        assert_eq!(reader.version(), version);
        let sheets = reader.read_all().unwrap();
        assert!(matches!(
            sheets[0].data.cell(at("A1")).map(|c| &c.content),
            Some(CellContent::Formula(_))
        ));
    }
}
