//! Driving the format-independent decoder from a custom walk.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata::{
    AddressConverter, CellAddress, Decoder, Format, RecordingSink, SheetEnv, SinkCall,
    VerbatimFormulaParser,
};
use sheetdata_core::{BiffVersion, NoStyles};

fn env(addresses: AddressConverter) -> SheetEnv<'static> {
    SheetEnv::new(0, addresses, &VerbatimFormulaParser, &NoStyles)
}

/// Cell setter calls as (address, call) pairs
fn cells(sink: &RecordingSink) -> Vec<(CellAddress, SinkCall)> {
    sink.cell_calls()
        .filter_map(|call| call.cell().map(|c| (c.address, call.clone())))
        .collect()
}

#[test]
fn test_xml_worksheet_part() {
    let xml = r#"<worksheet><sheetData><row r="3"><c r="C3" t="b"><v>1</v></c></row></sheetData></worksheet>"#;
    let mut decoder = Decoder::xml(env(AddressConverter::for_ooxml()), RecordingSink::new());
    sheetdata_xlsx::decode_xml(xml.as_bytes(), &mut decoder).unwrap();
    assert_eq!(decoder.format(), Format::Xlsx);

    let calls = cells(decoder.sink());
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, CellAddress::new(2, 2));
    assert!(matches!(calls[0].1, SinkCall::Boolean(_, true)));
}

#[test]
fn test_binary_worksheet_part() {
    use sheetdata_xlsb::records;
    use sheetdata_xlsb::stream::write_record;

    let mut cell = Vec::new();
    cell.extend(4i32.to_le_bytes());
    cell.extend([0; 4]);
    cell.push(0x07);
    let mut row = 9i32.to_le_bytes().to_vec();
    row.extend([0; 9]);
    row.extend(0i32.to_le_bytes());

    let mut stream = Vec::new();
    write_record(&mut stream, records::SHEETDATA, &[]).unwrap();
    write_record(&mut stream, records::ROW, &row).unwrap();
    write_record(&mut stream, records::CELL_ERROR, &cell).unwrap();
    write_record(&mut stream, records::SHEETDATA_END, &[]).unwrap();

    let mut decoder = Decoder::binary(env(AddressConverter::for_ooxml()), RecordingSink::new());
    sheetdata_xlsb::decode_records(Cursor::new(stream), &mut decoder).unwrap();

    let calls = cells(&decoder.into_sink());
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, CellAddress::new(9, 4));
    assert!(matches!(calls[0].1, SinkCall::ErrorCode(_, 0x07)));
}

#[test]
fn test_legacy_worksheet_records() {
    let records = sheetdata_xls::biff::read_all_records(&crate::xls_stream()).unwrap();
    let groups = sheetdata_xls::biff::split_substreams(&records);
    assert_eq!(groups.len(), 2);

    let version = BiffVersion::Biff8;
    let mut decoder = Decoder::legacy(
        env(AddressConverter::for_biff(version)),
        version,
        1252,
        RecordingSink::new(),
    );
    sheetdata_xls::biff::decode_records(&records[groups[1].clone()], &mut decoder).unwrap();

    let calls = cells(decoder.sink());
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0].1, SinkCall::Value(_, v) if v == 42.0));
    assert!(matches!(&calls[1].1, SinkCall::String(_, text) if text == "hello"));
}
