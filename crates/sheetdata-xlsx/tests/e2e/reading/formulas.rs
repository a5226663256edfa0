//! Formula, shared-formula, array and data-table handling.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use sheetdata_core::{
    CellAddress, CellContent, CellRange, FormulaToken, SharedFormulaKey, TokenSequence,
};
use sheetdata_xlsx::XlsxReader;

use crate::{build_xlsx, worksheet};

fn expr(text: &str) -> TokenSequence {
    TokenSequence::new(vec![FormulaToken::Expression(text.into())])
}

#[test]
fn test_formula_kinds() {
    let xml = worksheet(
        r#"<row r="1">
  <c r="A1"><f>B1+C1</f><v>3</v></c>
  <c r="B1"><f t="shared" ref="B1:B3" si="0">C1*2</f><v>2</v></c>
</row>
<row r="2">
  <c r="B2"><f t="shared" si="0"/><v>4</v></c>
  <c r="D2"><f t="array" ref="D2:E3">A1:B2*10</f><v>10</v></c>
  <c r="E2"><v>20</v></c>
</row>
<row r="3">
  <c r="B3"><f t="shared" si="0"/><v>6</v></c>
  <c r="G3"><f t="dataTable" ref="G3:H4" dt2D="0" dtr="1" r1="A1"/><v>1</v></c>
</row>"#,
    );
    let bytes = build_xlsx(&[("F", xml)], &[]);
    let sheets = XlsxReader::open(Cursor::new(bytes))
        .unwrap()
        .read_all()
        .unwrap();
    let sheet = &sheets[0].data;
    let content = |a1: &str| {
        sheet
            .cell(CellAddress::parse(a1).unwrap())
            .map(|c| c.content.clone())
    };

    assert_eq!(content("A1"), Some(CellContent::Formula(expr("B1+C1"))));
    assert_eq!(content("B1"), Some(CellContent::SharedFormula(0)));
    assert_eq!(content("B2"), Some(CellContent::SharedFormula(0)));
    assert_eq!(content("B3"), Some(CellContent::SharedFormula(0)));
    assert_eq!(sheet.shared_formulas().keys(), vec![SharedFormulaKey::Id(0)]);
    assert_eq!(
        sheet.shared_formulas().get(&SharedFormulaKey::Id(0)),
        Some(&expr("C1*2"))
    );

    assert_eq!(
        sheet.array_formulas(),
        &[(CellRange::parse("D2:E3").unwrap(), expr("A1:B2*10"))]
    );
    assert_eq!(content("D2"), Some(CellContent::Blank));
    assert_eq!(content("E2"), Some(CellContent::Number(20.0)));

    let tables = sheet.table_operations();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].0, CellRange::parse("G3:H4").unwrap());
    assert!(tables[0].1.row_table);
    assert_eq!(tables[0].1.ref1, "A1");
    assert_eq!(content("G3"), Some(CellContent::Blank));
}
