//! BIFF12 sheet-data record decoder

use sheetdata_core::binary::{read_f64, read_i32, read_rk, read_u16, read_u32, read_u8, skip};
use sheetdata_core::{
    CellAddress, CellCursor, CellData, CellRange, CellType, DecodedEvent, FormulaContext,
    FormulaData, FormulaKind, FormulaSource, Fragment, Result, RichString, RowModel,
    SharedFormulaKey, SheetDataDecoder, SheetDataSink, SheetEnv, TableData,
};

use crate::records::{self, CellShape, ValueLayout};
use crate::rich::{read_rich_string, read_wide_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InSheetData,
    InRow,
}

/// Decoded body of a cell record
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Blank,
    Number(f64),
    Boolean(bool),
    Error(u8),
    Text(String),
    SharedString(i32),
    Rich(RichString),
}

impl CellValue {
    fn read(layout: ValueLayout, data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(match layout {
            ValueLayout::Blank => CellValue::Blank,
            ValueLayout::Rk => CellValue::Number(read_rk(data, offset)?),
            ValueLayout::Double => CellValue::Number(read_f64(data, offset)?),
            ValueLayout::Bool => CellValue::Boolean(read_u8(data, offset)? != 0),
            ValueLayout::Error => CellValue::Error(read_u8(data, offset)?),
            ValueLayout::String => CellValue::Text(read_wide_string(data, offset)?),
            ValueLayout::SharedString => CellValue::SharedString(read_i32(data, offset)?),
            ValueLayout::RichString => CellValue::Rich(read_rich_string(data, offset)?),
        })
    }

    fn cell_type(&self) -> CellType {
        match self {
            CellValue::Blank => CellType::Blank,
            CellValue::Number(_) => CellType::Numeric,
            CellValue::Boolean(_) => CellType::Boolean,
            CellValue::Error(_) => CellType::Error,
            CellValue::Text(_) => CellType::String,
            CellValue::SharedString(_) => CellType::SharedString,
            CellValue::Rich(_) => CellType::InlineString,
        }
    }
}

/// Decodes the sheet-data records of one BIFF12 worksheet stream.
///
/// A row lasts until the next row record or the end of the sheet data.
/// Array, shared-formula and data-table records apply to the cell decoded
/// just before them.
pub struct BinarySheetData<'a, S> {
    env: SheetEnv<'a>,
    sink: S,
    state: State,
    cursor: CellCursor,
    last_cell: Option<CellData>,
}

impl<'a, S: SheetDataSink> BinarySheetData<'a, S> {
    pub fn new(env: SheetEnv<'a>, sink: S) -> Self {
        Self {
            env,
            sink,
            state: State::Outside,
            cursor: CellCursor::new(),
            last_cell: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finish decoding and hand back the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn import_record(&mut self, id: u32, data: &[u8]) -> Result<DecodedEvent> {
        match (self.state, id) {
            (_, records::SHEETDATA) => {
                self.state = State::InSheetData;
                self.cursor.reset();
                self.last_cell = None;
                Ok(DecodedEvent::Handled)
            }
            (State::Outside, _) => Ok(DecodedEvent::Ignored),
            (_, records::SHEETDATA_END) => {
                self.state = State::Outside;
                Ok(DecodedEvent::Handled)
            }
            (_, records::ROW) => self.import_row(data),
            (State::InRow, records::ARRAY) => self.import_array(data),
            (State::InRow, records::SHAREDFMLA) => self.import_shared_formula(data),
            (State::InRow, records::DATATABLE) => self.import_data_table(data),
            (State::InRow, id) => match records::cell_record(id) {
                Some((shape, layout)) => self.import_cell(shape, layout, data),
                None => {
                    log::debug!("ignoring record 0x{:04X} in row", id);
                    Ok(DecodedEvent::Ignored)
                }
            },
            (State::InSheetData, id) => {
                log::debug!("ignoring record 0x{:04X} outside a row", id);
                Ok(DecodedEvent::Ignored)
            }
        }
    }

    fn import_row(&mut self, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let row = read_i32(data, &mut off)?;
        let xf_id = read_u32(data, &mut off)?;
        let height = read_u16(data, &mut off)?;
        let flags1 = read_u16(data, &mut off)?;
        let flags2 = read_u8(data, &mut off)?;
        let span_count = read_i32(data, &mut off)?;

        self.last_cell = None;
        if row < 0 || row as i64 > self.env.addresses.max_row() as i64 {
            log::warn!("skipping row with invalid index {}", row);
            self.state = State::InSheetData;
            return Ok(DecodedEvent::Ignored);
        }
        self.state = State::InRow;
        self.cursor.begin_row(row as u32);

        let mut model = RowModel::new(row + 1);
        model.height = height as f64 / 20.0;
        model.xf_id = Some(xf_id);
        model.level = ((flags1 >> 8) & 0x07) as u8;
        model.custom_height = flags1 & records::ROW_CUSTOMHEIGHT != 0;
        model.custom_format = flags1 & records::ROW_CUSTOMFORMAT != 0;
        model.show_phonetic = flags2 & records::ROW_SHOWPHONETIC != 0;
        model.hidden = flags1 & records::ROW_HIDDEN != 0;
        model.collapsed = flags1 & records::ROW_COLLAPSED != 0;
        model.thick_top = flags1 & records::ROW_THICKTOP != 0;
        model.thick_bottom = flags1 & records::ROW_THICKBOTTOM != 0;

        let max_col = self.env.addresses.max_col() as i32;
        for _ in 0..span_count.max(0) {
            let (Ok(first), Ok(last)) = (read_i32(data, &mut off), read_i32(data, &mut off)) else {
                break;
            };
            model.insert_col_span(first, last, max_col);
        }

        self.sink.set_row_model(&model);
        Ok(DecodedEvent::Handled)
    }

    fn import_cell(
        &mut self,
        shape: CellShape,
        layout: ValueLayout,
        data: &[u8],
    ) -> Result<DecodedEvent> {
        let mut off = 0;
        let col = match shape {
            CellShape::Value | CellShape::Formula => read_i32(data, &mut off)? as i64,
            CellShape::Multi => self.cursor.next_col(),
        };
        let xf = read_u32(data, &mut off)?;
        let value = CellValue::read(layout, data, &mut off)?;
        let formula = match shape {
            CellShape::Formula => {
                skip(data, &mut off, 2)?;
                Some(&data[off..])
            }
            CellShape::Value | CellShape::Multi => None,
        };

        let address = match self
            .env
            .addresses
            .to_cell_address_at(self.cursor.current_row() as i64, col)
        {
            Ok(address) => address,
            Err(e) => {
                log::warn!("skipping cell: {}", e);
                self.last_cell = None;
                return Ok(DecodedEvent::Ignored);
            }
        };

        self.cursor.set_cell(address);
        let cell = CellData {
            sheet: self.env.sheet,
            address,
            cell_type: value.cell_type(),
            xf_id: Some(xf & records::CELL_XF_MASK),
            show_phonetic: xf & records::CELL_SHOWPHONETIC != 0,
        };
        self.last_cell = Some(cell);
        self.sink.extend_used_area(address);

        if let Some(formula) = formula {
            let tokens = self.env.formulas.parse_formula(
                address,
                FormulaContext::Cell,
                FormulaSource::Biff12(formula),
            );
            if let Some(tokens) = tokens {
                self.sink.set_formula_cell(&cell, tokens);
                return Ok(DecodedEvent::Handled);
            }
            log::debug!("no formula tokens at {}, keeping cached result", address);
        }

        self.set_value(&cell, value);
        Ok(DecodedEvent::Handled)
    }

    fn set_value(&mut self, cell: &CellData, value: CellValue) {
        match value {
            CellValue::Blank => self.sink.set_blank_cell(cell),
            CellValue::Number(v) => self.sink.set_value_cell(cell, v),
            CellValue::Boolean(b) => self.sink.set_boolean_cell(cell, b),
            CellValue::Error(code) => self.sink.set_error_code_cell(cell, code),
            CellValue::Text(text) => self.sink.set_string_cell(cell, &text),
            CellValue::SharedString(index) => self.sink.set_shared_string_cell(cell, index),
            CellValue::Rich(rich) => self.sink.set_rich_string_cell(cell, &rich),
        }
    }

    /// Read a range given as first row, last row, first column, last column.
    /// A malformed range yields `None`.
    fn read_formula_range(&self, data: &[u8], off: &mut usize) -> Result<Option<CellRange>> {
        let first_row = read_i32(data, off)?;
        let last_row = read_i32(data, off)?;
        let first_col = read_i32(data, off)?;
        let last_col = read_i32(data, off)?;
        match self.env.addresses.to_cell_range_at(
            first_row as i64,
            last_row as i64,
            first_col as i64,
            last_col as i64,
        ) {
            Ok(range) => Ok(Some(range)),
            Err(e) => {
                log::debug!("ignoring formula range: {}", e);
                Ok(None)
            }
        }
    }

    /// The last decoded cell together with the declared range, when the cell
    /// is the range's top-left corner
    fn anchored(&self, kind: FormulaKind, range: Option<CellRange>) -> Option<(CellAddress, CellRange)> {
        let cell = self.last_cell?;
        let formula = FormulaData {
            kind,
            range,
            shared_id: None,
        };
        let valid = match kind {
            FormulaKind::Array => formula.is_valid_array_ref(cell.address),
            _ => formula.is_anchor(cell.address),
        };
        match (valid, range) {
            (true, Some(range)) => Some((cell.address, range)),
            _ => None,
        }
    }

    fn import_array(&mut self, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let range = self.read_formula_range(data, &mut off)?;
        let Some((anchor, range)) = self.anchored(FormulaKind::Array, range) else {
            return Ok(DecodedEvent::Ignored);
        };
        skip(data, &mut off, 1)?;
        match self.env.formulas.parse_formula(
            anchor,
            FormulaContext::Array,
            FormulaSource::Biff12(&data[off..]),
        ) {
            Some(tokens) => self.sink.create_array_formula(range, tokens),
            None => log::debug!("no array formula tokens at {}", anchor),
        }
        Ok(DecodedEvent::Handled)
    }

    fn import_shared_formula(&mut self, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let range = self.read_formula_range(data, &mut off)?;
        let Some((anchor, _)) = self.anchored(FormulaKind::Shared, range) else {
            return Ok(DecodedEvent::Ignored);
        };
        match self.env.formulas.parse_formula(
            anchor,
            FormulaContext::SharedFormula,
            FormulaSource::Biff12(&data[off..]),
        ) {
            Some(tokens) => self
                .sink
                .create_shared_formula(SharedFormulaKey::Anchor(anchor), tokens),
            None => log::debug!("no shared formula tokens at {}", anchor),
        }
        Ok(DecodedEvent::Handled)
    }

    fn import_data_table(&mut self, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let range = self.read_formula_range(data, &mut off)?;
        let ref1 = (read_i32(data, &mut off)?, read_i32(data, &mut off)?);
        let ref2 = (read_i32(data, &mut off)?, read_i32(data, &mut off)?);
        let flags = read_u8(data, &mut off)?;
        let Some((_, range)) = self.anchored(FormulaKind::DataTable, range) else {
            return Ok(DecodedEvent::Ignored);
        };

        let table = TableData {
            ref1: self.reference_text(ref1),
            ref2: self.reference_text(ref2),
            row_table: flags & records::DATATABLE_ROW != 0,
            two_dimensional: flags & records::DATATABLE_2D != 0,
            ref1_deleted: flags & records::DATATABLE_REF1DEL != 0,
            ref2_deleted: flags & records::DATATABLE_REF2DEL != 0,
        };
        self.sink.create_table_operation(range, &table);
        Ok(DecodedEvent::Handled)
    }

    /// A1 text of a (row, column) input cell, empty when out of range
    fn reference_text(&self, (row, col): (i32, i32)) -> String {
        self.env
            .addresses
            .to_cell_address_at(row as i64, col as i64)
            .map(|addr| addr.to_a1_string())
            .unwrap_or_default()
    }
}

impl<S: SheetDataSink> SheetDataDecoder for BinarySheetData<'_, S> {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent> {
        let Fragment::Record { id, data } = unit else {
            return Ok(DecodedEvent::Ignored);
        };
        match self.import_record(id, data) {
            Err(e) if e.is_record_local() => {
                log::warn!("skipping record 0x{:04X}: {}", id, e);
                Ok(DecodedEvent::Ignored)
            }
            other => other,
        }
    }
}
