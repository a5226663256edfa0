//! Formula cells, array formulas and shared formulas through a full read.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{
    CellAddress, CellContent, FormulaToken, ImportOptions, MemorySheet, SharedFormulaKey,
    TokenSequence,
};
use sheetdata_xls::biff::records;
use sheetdata_xls::XlsReader;

use crate::{biff8_sheet, build_biff8_stream, compound_file};

fn read_single(sheet: Vec<u8>) -> MemorySheet {
    let stream = build_biff8_stream(&[("Formulas", sheet)], &[]);
    let reader = XlsReader::open(Cursor::new(compound_file("/Workbook", &stream))).unwrap();
    reader
        .read_sheets(
            &ImportOptions::new().sheet_index(0),
            &sheetdata_core::VerbatimFormulaParser,
            |_, sst| MemorySheet::with_shared_strings(sst.clone()),
        )
        .unwrap()
        .remove(0)
        .data
}

fn rgce(bytes: &[u8]) -> TokenSequence {
    TokenSequence::new(vec![FormulaToken::Rgce(bytes.to_vec())])
}

#[test]
fn test_formula_cell() {
    let sheet = read_single(biff8_sheet(|b| {
        b.cell(0, 0, 0)
            .formula(3.0, &[0x1E, 0x03, 0x00])
            .record(records::BIFF5_FORMULA);
    }));
    let cell = sheet.cell(CellAddress::parse("A1").unwrap()).unwrap();
    assert_eq!(cell.content, CellContent::Formula(rgce(&[0x1E, 0x03, 0x00])));
}

#[test]
fn test_array_formula_at_anchor() {
    let sheet = read_single(biff8_sheet(|b| {
        b.cell(0, 0, 0)
            .formula(0.0, &[0x02, 0x00, 0x00, 0x00, 0x00])
            .record(records::BIFF5_FORMULA);
        b.u16(0)
            .u16(0)
            .u8(0)
            .u8(1)
            .u16(0)
            .u32(0)
            .u16(1)
            .u8(0x42)
            .record(records::BIFF3_ARRAY);
        b.cell(0, 1, 0)
            .formula(0.0, &[0x02, 0x00, 0x00, 0x00, 0x00])
            .record(records::BIFF5_FORMULA);
    }));

    let arrays = sheet.array_formulas();
    assert_eq!(arrays.len(), 1);
    assert_eq!(arrays[0].0.to_a1_string(), "A1:B1");
    assert_eq!(arrays[0].1, rgce(&[0x42]));
}

#[test]
fn test_shared_formula_keyed_by_anchor() {
    let sheet = read_single(biff8_sheet(|b| {
        b.cell(0, 3, 0)
            .formula(0.0, &[0x01, 0x00, 0x00, 0x03, 0x00])
            .record(records::BIFF5_FORMULA);
        b.u16(0)
            .u16(4)
            .u8(3)
            .u8(3)
            .u16(0x0500)
            .u16(1)
            .u8(0x24)
            .record(records::SHAREDFMLA);
    }));

    let anchor = CellAddress::parse("D1").unwrap();
    assert_eq!(
        sheet.shared_formulas().get(&SharedFormulaKey::Anchor(anchor)),
        Some(&rgce(&[0x24]))
    );
}

#[test]
fn test_string_result_without_tokens() {
    /// Leaves every formula to its cached result
    struct CachedOnly;

    impl sheetdata_core::FormulaParser for CachedOnly {
        fn parse_formula(
            &self,
            _base: CellAddress,
            _context: sheetdata_core::FormulaContext,
            _source: sheetdata_core::FormulaSource<'_>,
        ) -> Option<TokenSequence> {
            None
        }
    }

    let sheet = biff8_sheet(|b| {
        b.cell(0, 0, 0)
            .bytes(&[0, 0, 0, 0, 0, 0, 0xFF, 0xFF])
            .u16(0)
            .u32(0)
            .u16(1)
            .u8(0x17)
            .record(records::BIFF5_FORMULA);
        b.unicode("result").record(records::BIFF3_STRING);
    });
    let stream = build_biff8_stream(&[("Formulas", sheet)], &[]);
    let reader = XlsReader::open(Cursor::new(compound_file("/Workbook", &stream))).unwrap();
    let sheet = reader.decode_sheet(0, &CachedOnly, MemorySheet::new()).unwrap();
    assert_eq!(
        sheet.cell(CellAddress::parse("A1").unwrap()).unwrap().content,
        CellContent::Text("result".into())
    );
}
