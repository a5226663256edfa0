//! `sheetData` element decoder

use sheetdata_core::{
    parse_iso8601_datetime, AttributeList, CellAddress, CellCursor, CellData, CellType, DecodedEvent,
    FormulaContext, FormulaData, FormulaKind, FormulaSource, Fragment, Result, RichString,
    RowModel, SharedFormulaKey, SheetDataDecoder, SheetDataSink, SheetEnv, TableData,
    TokenSequence,
};

use crate::escapes::decode_excel_escapes;

/// Elements the decoder descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Worksheet,
    SheetData,
    Row,
    Cell,
    Value,
    Formula,
    InlineString,
    InlineRun,
    InlineText,
}

/// Decodes the `sheetData` element of one worksheet part.
///
/// Feed it the worksheet's XML events (from the root element or from
/// `sheetData` on); rows and cells are forwarded to the sink as they complete.
pub struct SheetDataContext<'a, S> {
    env: SheetEnv<'a>,
    sink: S,
    stack: Vec<Element>,
    cursor: CellCursor,

    // current cell
    cell: CellData,
    value: String,
    text: String,
    has_formula: bool,
    formula: FormulaData,
    table: TableData,
    tokens: Option<TokenSequence>,
    inline: Option<RichString>,
}

impl<'a, S: SheetDataSink> SheetDataContext<'a, S> {
    pub fn new(env: SheetEnv<'a>, sink: S) -> Self {
        Self {
            cell: CellData::new(env.sheet, CellAddress::new(0, 0)),
            env,
            sink,
            stack: Vec::new(),
            cursor: CellCursor::new(),
            value: String::new(),
            text: String::new(),
            has_formula: false,
            formula: FormulaData::default(),
            table: TableData::default(),
            tokens: None,
            inline: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finish decoding and hand back the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn current(&self) -> Option<Element> {
        self.stack.last().copied()
    }

    fn start_element(&mut self, element: &str, attrs: &AttributeList) -> DecodedEvent {
        let next = match (self.current(), element) {
            (None, "worksheet") => Some(Element::Worksheet),
            (None, "sheetData") | (Some(Element::Worksheet), "sheetData") => {
                self.cursor.reset();
                Some(Element::SheetData)
            }
            (Some(Element::SheetData), "row") => {
                self.import_row(attrs).then_some(Element::Row)
            }
            (Some(Element::Row), "c") => self.import_cell(attrs).then_some(Element::Cell),
            (Some(Element::Cell), "v") => {
                self.text.clear();
                Some(Element::Value)
            }
            (Some(Element::Cell), "f") => {
                self.import_formula(attrs);
                self.text.clear();
                Some(Element::Formula)
            }
            (Some(Element::Cell), "is") => {
                self.inline = Some(RichString::new());
                Some(Element::InlineString)
            }
            (Some(Element::InlineString), "t") | (Some(Element::InlineRun), "t") => {
                self.text.clear();
                Some(Element::InlineText)
            }
            (Some(Element::InlineString), "r") => Some(Element::InlineRun),
            _ => None,
        };

        match next {
            Some(element) => {
                self.stack.push(element);
                DecodedEvent::Descend
            }
            None => DecodedEvent::Skip,
        }
    }

    fn end_element(&mut self) -> DecodedEvent {
        let Some(element) = self.stack.pop() else {
            return DecodedEvent::Ignored;
        };

        match element {
            Element::Value => self.value = std::mem::take(&mut self.text),
            Element::Formula => self.finish_formula_text(),
            Element::InlineText => {
                let text = decode_excel_escapes(&self.text);
                self.text.clear();
                if let Some(inline) = self.inline.as_mut() {
                    inline.push_run(text, None);
                }
            }
            Element::Cell => self.finish_cell(),
            Element::Worksheet
            | Element::SheetData
            | Element::Row
            | Element::InlineString
            | Element::InlineRun => {}
        }
        DecodedEvent::Handled
    }

    fn characters(&mut self, text: &str) -> DecodedEvent {
        match self.current() {
            Some(Element::Value) | Some(Element::Formula) | Some(Element::InlineText) => {
                self.text.push_str(text);
                DecodedEvent::Handled
            }
            _ => DecodedEvent::Ignored,
        }
    }

    /// Returns `false` when the row index is out of range; the row is then skipped.
    fn import_row(&mut self, attrs: &AttributeList) -> bool {
        let row = match attrs.get_int("r") {
            Some(r) => r,
            None => self.cursor.next_row() + 1,
        };
        // implicit rows count on from a rejected row too
        if row < 1 {
            self.cursor.reset();
        } else if let Ok(index) = u32::try_from(row - 1) {
            self.cursor.begin_row(index);
        }
        if row < 1 || row > self.env.addresses.max_row() as i64 + 1 {
            log::warn!("skipping row with invalid index {}", row);
            return false;
        }

        let mut model = RowModel::new(row as i32);
        model.height = attrs.get_double("ht").unwrap_or(-1.0);
        model.xf_id = attrs
            .get_int("s")
            .and_then(|s| u32::try_from(s).ok());
        model.level = attrs.get_int("outlineLevel").unwrap_or(0).clamp(0, 7) as u8;
        model.custom_height = attrs.get_bool("customHeight").unwrap_or(false);
        model.custom_format = attrs.get_bool("customFormat").unwrap_or(false);
        model.show_phonetic = attrs.get_bool("ph").unwrap_or(false);
        model.hidden = attrs.get_bool("hidden").unwrap_or(false);
        model.collapsed = attrs.get_bool("collapsed").unwrap_or(false);
        model.thick_top = attrs.get_bool("thickTop").unwrap_or(false);
        model.thick_bottom = attrs.get_bool("thickBot").unwrap_or(false);

        // "first:last first:last ...", 1-based
        let max_col = self.env.addresses.max_col() as i32;
        for token in attrs.get("spans").unwrap_or("").split_whitespace() {
            let Some((first, last)) = token.split_once(':') else {
                continue;
            };
            if let (Ok(first), Ok(last)) = (first.parse::<i32>(), last.parse::<i32>()) {
                model.insert_col_span(first - 1, last - 1, max_col);
            }
        }

        self.sink.set_row_model(&model);
        true
    }

    /// Returns `false` when the cell address is invalid; the cell is then skipped.
    fn import_cell(&mut self, attrs: &AttributeList) -> bool {
        let address = match attrs.get("r").filter(|r| !r.is_empty()) {
            Some(r) => self.env.addresses.to_cell_address(r),
            None => self
                .env
                .addresses
                .to_cell_address_at(self.cursor.current_row() as i64, self.cursor.next_col()),
        };
        let address = match address {
            Ok(address) => address,
            Err(e) => {
                log::warn!("skipping cell: {}", e);
                return false;
            }
        };

        self.cursor.set_cell(address);
        self.cell = CellData {
            sheet: self.env.sheet,
            address,
            cell_type: CellType::from_xml_token(attrs.get("t")),
            xf_id: attrs.get_int("s").and_then(|s| u32::try_from(s).ok()),
            show_phonetic: attrs.get_bool("ph").unwrap_or(false),
        };

        self.value.clear();
        self.text.clear();
        self.inline = None;
        self.has_formula = false;
        self.tokens = None;

        self.sink.extend_used_area(address);
        true
    }

    fn import_formula(&mut self, attrs: &AttributeList) {
        self.has_formula = true;
        self.tokens = None;

        let range = attrs.get("ref").and_then(|r| match self.env.addresses.to_cell_range(r) {
            Ok(range) => Some(range),
            Err(e) => {
                log::debug!("ignoring formula range at {}: {}", self.cell.address, e);
                None
            }
        });
        self.formula = FormulaData {
            kind: FormulaKind::from_xml_token(attrs.get("t")),
            range,
            shared_id: attrs.get_int("si").and_then(|si| u32::try_from(si).ok()),
        };

        if self.formula.kind == FormulaKind::DataTable {
            self.table = TableData {
                ref1: attrs.get("r1").unwrap_or_default().to_string(),
                ref2: attrs.get("r2").unwrap_or_default().to_string(),
                row_table: attrs.get_bool("dtr").unwrap_or(false),
                two_dimensional: attrs.get_bool("dt2D").unwrap_or(false),
                ref1_deleted: attrs.get_bool("del1").unwrap_or(false),
                ref2_deleted: attrs.get_bool("del2").unwrap_or(false),
            };
        }
    }

    fn finish_formula_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        if text.trim().is_empty() {
            return;
        }
        let context = match self.formula.kind {
            FormulaKind::Normal => FormulaContext::Cell,
            FormulaKind::Shared => FormulaContext::SharedFormula,
            FormulaKind::Array => FormulaContext::Array,
            FormulaKind::DataTable | FormulaKind::Unknown => return,
        };
        self.tokens =
            self.env
                .formulas
                .parse_formula(self.cell.address, context, FormulaSource::Text(&text));
    }

    fn finish_cell(&mut self) {
        let addr = self.cell.address;
        if self.has_formula {
            match self.formula.kind {
                FormulaKind::Normal => {
                    if let Some(tokens) = self.tokens.take() {
                        self.sink.set_formula_cell(&self.cell, tokens);
                        return;
                    }
                }
                FormulaKind::Shared => {
                    if let Some(id) = self.formula.shared_id {
                        if self.formula.is_valid_shared_ref(addr) {
                            if let Some(tokens) = self.tokens.take() {
                                self.sink
                                    .create_shared_formula(SharedFormulaKey::Id(id), tokens);
                            }
                        }
                        self.sink.set_shared_formula_cell(&self.cell, id);
                        return;
                    }
                }
                FormulaKind::Array => {
                    if let (Some(range), true) =
                        (self.formula.range, self.formula.is_valid_array_ref(addr))
                    {
                        if let Some(tokens) = self.tokens.take() {
                            self.sink.create_array_formula(range, tokens);
                        }
                    }
                    self.sink.set_blank_cell(&self.cell);
                    return;
                }
                FormulaKind::DataTable => {
                    if let (Some(range), true) =
                        (self.formula.range, self.formula.is_anchor(addr))
                    {
                        self.sink.create_table_operation(range, &self.table);
                    }
                    self.sink.set_blank_cell(&self.cell);
                    return;
                }
                FormulaKind::Unknown => {}
            }
        }
        self.set_plain_value();
    }

    fn set_plain_value(&mut self) {
        let value = std::mem::take(&mut self.value);

        if self.cell.cell_type == CellType::InlineString {
            if let Some(mut inline) = self.inline.take() {
                inline.finalize();
                self.sink.set_rich_string_cell(&self.cell, &inline);
                return;
            }
        }

        if value.is_empty() {
            self.cell.cell_type = CellType::Blank;
            self.sink.set_blank_cell(&self.cell);
            return;
        }

        match self.cell.cell_type {
            CellType::Numeric => match value.trim().parse::<f64>() {
                Ok(v) => self.sink.set_value_cell(&self.cell, v),
                Err(_) => {
                    log::warn!("non-numeric value '{}' in cell {}", value, self.cell.address);
                    self.sink.set_error_cell(&self.cell, &value);
                }
            },
            CellType::Date => match parse_iso8601_datetime(&value) {
                Some(dt) => self.sink.set_date_time_cell(&self.cell, dt),
                None => self.sink.set_error_cell(&self.cell, &value),
            },
            CellType::Boolean => {
                let flag = match value.trim() {
                    "true" | "TRUE" => true,
                    "false" | "FALSE" => false,
                    other => other.parse::<f64>().map_or(false, |v| v != 0.0),
                };
                self.sink.set_boolean_cell(&self.cell, flag);
            }
            CellType::Error => self.sink.set_error_cell(&self.cell, &value),
            CellType::SharedString => match value.trim().parse::<i32>() {
                Ok(index) => self.sink.set_shared_string_cell(&self.cell, index),
                Err(_) => {
                    log::warn!(
                        "invalid shared string index '{}' in cell {}",
                        value,
                        self.cell.address
                    );
                    self.sink.set_error_cell(&self.cell, &value);
                }
            },
            CellType::String
            | CellType::InlineString
            | CellType::Unset
            | CellType::Blank => {
                self.sink
                    .set_string_cell(&self.cell, &decode_excel_escapes(&value));
            }
        }
    }
}

impl<S: SheetDataSink> SheetDataDecoder for SheetDataContext<'_, S> {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent> {
        Ok(match unit {
            Fragment::Start {
                element,
                attributes,
            } => self.start_element(element, attributes),
            Fragment::Characters(text) => self.characters(text),
            Fragment::End { .. } => self.end_element(),
            Fragment::Record { .. } => DecodedEvent::Ignored,
        })
    }
}
