//! Legacy BIFF sheet-data record decoder

use sheetdata_core::binary::{read_bytes, read_f64, read_i32, read_rk, read_u16, read_u32, read_u8, skip};
use sheetdata_core::{
    Biff2CellFormat, BiffLayout, BiffVersion, CellAddress, CellData, CellRange, CellType,
    DecodedEvent, FormulaContext, FormulaData, FormulaKind, FormulaSource, Fragment, Result,
    RichString, RowModel, SharedFormulaKey, SheetDataDecoder, SheetDataSink, SheetEnv,
    StringShape, TableData, XfShape,
};

use crate::biff::records::{self, RecordKind, TableShape};
use crate::biff::strings::{read_byte_string, read_unicode_string};

/// Format reference of a cell record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellFormat {
    Xf(u32),
    /// BIFF2 attribute bytes of a workbook without XF table
    Inline([u8; 3]),
    /// BIFF2 cell deferring to the preceding IXFE record
    Ixfe,
}

impl CellFormat {
    fn xf_id(self) -> Option<u32> {
        match self {
            CellFormat::Xf(xf) => Some(xf),
            CellFormat::Inline(_) | CellFormat::Ixfe => None,
        }
    }
}

/// Row, column and format shared by all cell records
#[derive(Debug, Clone, Copy)]
struct CellHeader {
    row: u16,
    col: u16,
    format: CellFormat,
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

/// Cached result of a FORMULA record
#[derive(Debug, Clone, Copy, PartialEq)]
enum FormulaResult {
    Number(f64),
    Boolean(bool),
    Error(u8),
    /// Text follows in a STRING record
    String,
    Empty,
}

impl FormulaResult {
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        if u16::from_le_bytes([raw[6], raw[7]]) != records::FORMULA_RESULT_SPECIAL {
            return FormulaResult::Number(f64::from_le_bytes(raw));
        }
        match raw[0] {
            records::FORMULA_RESULT_STRING => FormulaResult::String,
            records::FORMULA_RESULT_BOOL => FormulaResult::Boolean(raw[2] != 0),
            records::FORMULA_RESULT_ERROR => FormulaResult::Error(raw[2]),
            records::FORMULA_RESULT_EMPTY => FormulaResult::Empty,
            _ => FormulaResult::Empty,
        }
    }

    fn cell_type(self) -> CellType {
        match self {
            FormulaResult::Number(_) => CellType::Numeric,
            FormulaResult::Boolean(_) => CellType::Boolean,
            FormulaResult::Error(_) => CellType::Error,
            FormulaResult::String => CellType::String,
            FormulaResult::Empty => CellType::Blank,
        }
    }
}

/// Decodes the sheet-data records of one legacy BIFF worksheet substream.
///
/// Legacy cell records carry their own row, so there is no row state.
/// Array, shared-formula and data-table records apply to the cell decoded
/// just before them; an IXFE record applies to the next BIFF2 cell record
/// that defers to it.
pub struct BiffSheetData<'a, S> {
    env: SheetEnv<'a>,
    sink: S,
    version: BiffVersion,
    layout: &'static BiffLayout,
    code_page: u16,
    has_xfs: Option<bool>,
    ixfe: Option<u16>,
    last_cell: Option<CellData>,
    pending_string: Option<CellData>,
}

/// One MULRK or MULBLANK entry: format id and, for MULRK, the RK value
fn read_multi_entry(data: &[u8], off: &mut usize, with_values: bool) -> Result<(u16, CellValue)> {
    let xf = read_u16(data, off)?;
    let value = if with_values {
        CellValue::Number(read_rk(data, off)?)
    } else {
        CellValue::Blank
    };
    Ok((xf, value))
}

impl<'a, S: SheetDataSink> BiffSheetData<'a, S> {
    /// Create a decoder for `version`; `code_page` decodes byte strings whose
    /// font declares no character set
    pub fn new(env: SheetEnv<'a>, version: BiffVersion, code_page: u16, sink: S) -> Self {
        Self {
            env,
            sink,
            version,
            layout: version.layout(),
            code_page,
            has_xfs: None,
            ixfe: None,
            last_cell: None,
            pending_string: None,
        }
    }

    pub fn version(&self) -> BiffVersion {
        self.version
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finish decoding and hand back the sink
    pub fn into_sink(mut self) -> S {
        self.flush_pending_string();
        self.sink
    }

    fn import_record(&mut self, id: u16, data: &[u8]) -> Result<DecodedEvent> {
        let entry = records::sheet_data_record(self.version, id);
        let kind = entry.map(|e| e.kind);
        if !matches!(
            kind,
            Some(
                RecordKind::FormulaString
                    | RecordKind::Array
                    | RecordKind::SharedFormula
                    | RecordKind::DataTable(_)
            )
        ) {
            self.flush_pending_string();
        }
        let Some(entry) = entry else {
            return Ok(DecodedEvent::Ignored);
        };
        let shape = entry.xf.unwrap_or(XfShape::Full16);

        match entry.kind {
            RecordKind::Row => self.import_row(id, data),
            RecordKind::Ixfe => {
                let mut off = 0;
                self.ixfe = Some(read_u16(data, &mut off)?);
                Ok(DecodedEvent::Handled)
            }
            RecordKind::Blank
            | RecordKind::Integer
            | RecordKind::Number
            | RecordKind::Rk
            | RecordKind::BoolErr
            | RecordKind::Label
            | RecordKind::RichLabel
            | RecordKind::LabelSst => self.import_cell(entry.kind, shape, data),
            RecordKind::MultiBlank => self.import_multi(data, false),
            RecordKind::MultiRk => self.import_multi(data, true),
            RecordKind::Formula => self.import_formula(shape, data),
            RecordKind::FormulaString => self.import_formula_string(id, data),
            RecordKind::Array => self.import_array(data),
            RecordKind::SharedFormula => self.import_shared_formula(data),
            RecordKind::DataTable(table) => self.import_data_table(table, data),
        }
    }

    fn import_row(&mut self, id: u16, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let row = read_u16(data, &mut off)?;
        let first_used = read_u16(data, &mut off)?;
        let first_free = read_u16(data, &mut off)?;
        let height = read_u16(data, &mut off)?;

        let mut model = RowModel::new(row as i32 + 1);
        model.height = (height & 0x7FFF) as f64 / 20.0;
        if id == records::BIFF2_ROW {
            skip(data, &mut off, 2)?;
            model.custom_format = read_u8(data, &mut off)? == records::BIFF2_ROW_CUSTOMFORMAT;
            if model.custom_format {
                skip(data, &mut off, 5)?;
                model.xf_id = Some(read_u16(data, &mut off)? as u32);
            }
        } else {
            skip(data, &mut off, 4)?;
            let flags = read_u32(data, &mut off)?;
            model.xf_id = Some((flags >> 16) & 0x0FFF);
            model.level = (flags & 0x07) as u8;
            model.collapsed = flags & records::ROW_COLLAPSED != 0;
            model.hidden = flags & records::ROW_HIDDEN != 0;
            model.custom_height = flags & records::ROW_CUSTOMHEIGHT != 0;
            model.custom_format = flags & records::ROW_CUSTOMFORMAT != 0;
            model.thick_top = flags & records::ROW_THICKTOP != 0;
            model.thick_bottom = flags & records::ROW_THICKBOTTOM != 0;
            model.show_phonetic = flags & records::ROW_SHOWPHONETIC != 0;
        }

        if row as u32 > self.env.addresses.max_row() {
            log::warn!("skipping row with invalid index {}", row);
            return Ok(DecodedEvent::Ignored);
        }
        if first_used < first_free {
            model.insert_col_span(
                first_used as i32,
                first_free as i32 - 1,
                self.env.addresses.max_col() as i32,
            );
        }
        self.sink.set_row_model(&model);
        Ok(DecodedEvent::Handled)
    }

    /// Read row, column and format id of a cell record
    fn read_header(&mut self, shape: XfShape, data: &[u8], off: &mut usize) -> Result<CellHeader> {
        let row = read_u16(data, off)?;
        let col = read_u16(data, off)?;
        let format = match shape {
            XfShape::Full16 => CellFormat::Xf(read_u16(data, off)? as u32),
            XfShape::NarrowWithIndirection => {
                let attrs = read_bytes(data, off, 3)?;
                let attrs = [attrs[0], attrs[1], attrs[2]];
                let has_xfs = *self
                    .has_xfs
                    .get_or_insert_with(|| self.env.styles.has_cell_xfs());
                if !has_xfs {
                    CellFormat::Inline(attrs)
                } else if attrs[0] & records::BIFF2_XF_MASK == records::BIFF2_XF_USE_IXFE {
                    CellFormat::Ixfe
                } else {
                    CellFormat::Xf((attrs[0] & records::BIFF2_XF_MASK) as u32)
                }
            }
        };
        Ok(CellHeader { row, col, format })
    }

    /// Validate the address of a decoded cell and announce it to the sink.
    ///
    /// Returns `None` (and forgets the previous cell) when the address is out
    /// of range.
    fn begin_cell(
        &mut self,
        row: u16,
        col: i64,
        format: CellFormat,
        cell_type: CellType,
    ) -> Option<CellData> {
        let address = match self.env.addresses.to_cell_address_at(row as i64, col) {
            Ok(address) => address,
            Err(e) => {
                log::warn!("skipping cell: {}", e);
                self.last_cell = None;
                return None;
            }
        };

        let cell = CellData {
            sheet: self.env.sheet,
            address,
            cell_type,
            xf_id: self.take_xf_id(format),
            show_phonetic: false,
        };
        self.last_cell = Some(cell);
        self.sink.extend_used_area(address);
        if let CellFormat::Inline(attrs) = format {
            self.sink
                .set_inline_cell_format(&cell, Biff2CellFormat::from_bytes(attrs));
        }
        Some(cell)
    }

    /// Format id of `format` without using up a pending IXFE value
    fn peek_xf_id(&self, format: CellFormat) -> Option<u32> {
        match format {
            CellFormat::Ixfe => self.ixfe.map(u32::from),
            other => other.xf_id(),
        }
    }

    /// Format id of an accepted cell; a pending IXFE value is consumed
    fn take_xf_id(&mut self, format: CellFormat) -> Option<u32> {
        match format {
            CellFormat::Ixfe => {
                let xf = self.ixfe.take().map(u32::from);
                if xf.is_none() {
                    log::debug!("cell defers to a missing IXFE record");
                }
                xf
            }
            other => other.xf_id(),
        }
    }

    /// Code page of byte strings in a cell using `xf_id`
    fn string_code_page(&self, xf_id: Option<u32>) -> u16 {
        xf_id
            .and_then(|xf| self.env.styles.font_code_page(xf))
            .unwrap_or(self.code_page)
    }

    fn import_cell(&mut self, kind: RecordKind, shape: XfShape, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let header = self.read_header(shape, data, &mut off)?;
        let narrow = shape == XfShape::NarrowWithIndirection;
        let value = match kind {
            RecordKind::Blank => CellValue::Blank,
            RecordKind::Integer => CellValue::Number(read_u16(data, &mut off)? as f64),
            RecordKind::Number => CellValue::Number(read_f64(data, &mut off)?),
            RecordKind::Rk => CellValue::Number(read_rk(data, &mut off)?),
            RecordKind::BoolErr => {
                let value = read_u8(data, &mut off)?;
                match read_u8(data, &mut off)? {
                    records::BOOLERR_BOOL => CellValue::Boolean(value != 0),
                    records::BOOLERR_ERROR => CellValue::Error(value),
                    _ => CellValue::Blank,
                }
            }
            RecordKind::Label => self.read_label(data, &mut off, narrow, header.format)?,
            RecordKind::RichLabel => self.read_rich_label(data, &mut off, header.format)?,
            RecordKind::LabelSst => CellValue::SharedString(read_i32(data, &mut off)?),
            _ => return Ok(DecodedEvent::Ignored),
        };

        let Some(cell) = self.begin_cell(header.row, header.col as i64, header.format, value.cell_type())
        else {
            return Ok(DecodedEvent::Ignored);
        };
        self.set_value(&cell, value);
        Ok(DecodedEvent::Handled)
    }

    fn read_label(
        &self,
        data: &[u8],
        off: &mut usize,
        narrow: bool,
        format: CellFormat,
    ) -> Result<CellValue> {
        match self.layout.strings {
            StringShape::Unicode => {
                let text = read_unicode_string(data, off)?;
                if text.runs.is_empty() {
                    Ok(CellValue::Text(text.text))
                } else {
                    Ok(CellValue::Rich(text.to_rich_string()))
                }
            }
            StringShape::ByteString => {
                let code_page = self.string_code_page(self.peek_xf_id(format));
                Ok(CellValue::Text(read_byte_string(data, off, !narrow, code_page)?))
            }
        }
    }

    /// RSTRING: a label followed by its formatting runs
    fn read_rich_label(&self, data: &[u8], off: &mut usize, format: CellFormat) -> Result<CellValue> {
        let (text, portions) = match self.layout.strings {
            StringShape::Unicode => {
                let text = read_unicode_string(data, off)?.text;
                let count = if *off < data.len() { read_u16(data, off)? } else { 0 };
                let mut portions = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let first = read_u16(data, off)? as usize;
                    portions.push((first, read_u16(data, off)?));
                }
                (text, portions)
            }
            StringShape::ByteString => {
                let code_page = self.string_code_page(self.peek_xf_id(format));
                let text = read_byte_string(data, off, true, code_page)?;
                let count = if *off < data.len() { read_u8(data, off)? } else { 0 };
                let mut portions = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let first = read_u8(data, off)? as usize;
                    portions.push((first, read_u8(data, off)? as u16));
                }
                (text, portions)
            }
        };
        let units: Vec<u16> = text.encode_utf16().collect();
        Ok(CellValue::Rich(RichString::from_font_portions(&units, &portions)))
    }

    /// MULBLANK and MULRK: consecutive cells of one row, each with its own
    /// format id. Decoding stops at the first column out of range or at a
    /// torn entry; cells before it are kept.
    fn import_multi(&mut self, data: &[u8], with_values: bool) -> Result<DecodedEvent> {
        let mut off = 0;
        let row = read_u16(data, &mut off)?;
        let mut col = read_u16(data, &mut off)? as i64;
        while data.len() - off > 2 {
            let (xf, value) = match read_multi_entry(data, &mut off, with_values) {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("multi-cell record cut short at row {} column {}: {}", row, col, e);
                    break;
                }
            };
            let Some(cell) = self.begin_cell(row, col, CellFormat::Xf(xf as u32), value.cell_type())
            else {
                break;
            };
            self.set_value(&cell, value);
            col += 1;
        }
        Ok(DecodedEvent::Handled)
    }

    fn import_formula(&mut self, shape: XfShape, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let header = self.read_header(shape, data, &mut off)?;
        let result = FormulaResult::from_bytes(read_bytes(data, &mut off, 8)?);
        skip(data, &mut off, self.layout.formula_skip - 8)?;
        let formula = &data[off..];

        let Some(cell) = self.begin_cell(header.row, header.col as i64, header.format, result.cell_type())
        else {
            return Ok(DecodedEvent::Ignored);
        };
        let tokens = self.env.formulas.parse_formula(
            cell.address,
            FormulaContext::Cell,
            FormulaSource::Biff {
                version: self.version,
                data: formula,
            },
        );
        if let Some(tokens) = tokens {
            self.sink.set_formula_cell(&cell, tokens);
            return Ok(DecodedEvent::Handled);
        }

        log::debug!("no formula tokens at {}, keeping cached result", cell.address);
        match result {
            FormulaResult::Number(v) => self.sink.set_value_cell(&cell, v),
            FormulaResult::Boolean(b) => self.sink.set_boolean_cell(&cell, b),
            FormulaResult::Error(code) => self.sink.set_error_code_cell(&cell, code),
            FormulaResult::Empty => self.sink.set_blank_cell(&cell),
            FormulaResult::String => self.pending_string = Some(cell),
        }
        Ok(DecodedEvent::Handled)
    }

    /// STRING: cached text result of the preceding formula
    fn import_formula_string(&mut self, id: u16, data: &[u8]) -> Result<DecodedEvent> {
        let Some(cell) = self.pending_string else {
            return Ok(DecodedEvent::Ignored);
        };
        let mut off = 0;
        let text = match self.layout.strings {
            StringShape::Unicode => read_unicode_string(data, &mut off)?.text,
            StringShape::ByteString => {
                let code_page = self.string_code_page(cell.xf_id);
                read_byte_string(data, &mut off, id != records::BIFF2_STRING, code_page)?
            }
        };
        self.pending_string = None;
        self.sink.set_string_cell(&cell, &text);
        Ok(DecodedEvent::Handled)
    }

    /// A string-result formula whose STRING record never came stays blank
    fn flush_pending_string(&mut self) {
        if let Some(cell) = self.pending_string.take() {
            log::debug!("no STRING record for formula at {}", cell.address);
            self.sink.set_blank_cell(&cell);
        }
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

    /// Read a range given as first row, last row (16-bit) and first column,
    /// last column (8-bit). A malformed range yields `None`.
    fn read_formula_range(&self, data: &[u8], off: &mut usize) -> Result<Option<CellRange>> {
        let first_row = read_u16(data, off)?;
        let last_row = read_u16(data, off)?;
        let first_col = read_u8(data, off)?;
        let last_col = read_u8(data, off)?;
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
        skip(data, &mut off, self.layout.array_skip)?;
        match self.env.formulas.parse_formula(
            anchor,
            FormulaContext::Array,
            FormulaSource::Biff {
                version: self.version,
                data: &data[off..],
            },
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
        // reserved byte, use count
        skip(data, &mut off, 2)?;
        match self.env.formulas.parse_formula(
            anchor,
            FormulaContext::SharedFormula,
            FormulaSource::Biff {
                version: self.version,
                data: &data[off..],
            },
        ) {
            Some(tokens) => self
                .sink
                .create_shared_formula(SharedFormulaKey::Anchor(anchor), tokens),
            None => log::debug!("no shared formula tokens at {}", anchor),
        }
        Ok(DecodedEvent::Handled)
    }

    fn import_data_table(&mut self, shape: TableShape, data: &[u8]) -> Result<DecodedEvent> {
        let mut off = 0;
        let range = self.read_formula_range(data, &mut off)?;
        let mut table = TableData::default();
        match shape {
            TableShape::Biff2 => {
                skip(data, &mut off, 1)?;
                table.row_table = read_u8(data, &mut off)? != 0;
                table.ref1 = self.read_reference(data, &mut off)?;
            }
            TableShape::Biff2TwoDim => {
                skip(data, &mut off, 2)?;
                table.two_dimensional = true;
                table.ref1 = self.read_reference(data, &mut off)?;
                table.ref2 = self.read_reference(data, &mut off)?;
            }
            TableShape::Flags => {
                let flags = read_u16(data, &mut off)?;
                table.row_table = flags & records::DATATABLE_ROW != 0;
                table.two_dimensional = flags & records::DATATABLE_2D != 0;
                table.ref1_deleted = flags & records::DATATABLE_REF1DEL != 0;
                table.ref2_deleted = flags & records::DATATABLE_REF2DEL != 0;
                table.ref1 = self.read_reference(data, &mut off)?;
                table.ref2 = self.read_reference(data, &mut off)?;
            }
        }
        let Some((_, range)) = self.anchored(FormulaKind::DataTable, range) else {
            return Ok(DecodedEvent::Ignored);
        };
        self.sink.create_table_operation(range, &table);
        Ok(DecodedEvent::Handled)
    }

    /// A1 text of a (row, column) input cell, empty when out of range
    fn read_reference(&self, data: &[u8], off: &mut usize) -> Result<String> {
        let row = read_u16(data, off)?;
        let col = read_u16(data, off)?;
        Ok(self
            .env
            .addresses
            .to_cell_address_at(row as i64, col as i64)
            .map(|addr| addr.to_a1_string())
            .unwrap_or_default())
    }
}

impl<S: SheetDataSink> SheetDataDecoder for BiffSheetData<'_, S> {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent> {
        let Fragment::Record { id, data } = unit else {
            return Ok(DecodedEvent::Ignored);
        };
        let Ok(id) = u16::try_from(id) else {
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
