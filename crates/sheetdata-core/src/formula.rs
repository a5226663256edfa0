//! Formula token collaborator
//!
//! The import engine only triggers formula parsing; the token grammar belongs
//! to whichever [`FormulaParser`] the host supplies.

use crate::binary::{read_bytes, read_u16, read_u32, read_u8};
use crate::cell::CellAddress;
use crate::legacy::BiffVersion;

/// One element of a parsed formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaToken {
    /// Formula text as written in the XML format (without leading `=`)
    Expression(String),
    /// Raw parsed-expression bytes of a binary format
    Rgce(Vec<u8>),
    /// Trailing data following the expression (constant arrays, names)
    Extra(Vec<u8>),
}

/// Opaque parsed formula
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSequence {
    pub tokens: Vec<FormulaToken>,
}

impl TokenSequence {
    pub fn new(tokens: Vec<FormulaToken>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The expression text, when the formula came from text
    pub fn expression(&self) -> Option<&str> {
        self.tokens.iter().find_map(|t| match t {
            FormulaToken::Expression(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// What the parsed formula will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaContext {
    /// Formula of a single cell
    Cell,
    /// Definition of a shared-formula group
    SharedFormula,
    /// Definition of an array formula
    Array,
}

/// Raw formula payload in one of the supported encodings
#[derive(Debug, Clone, Copy)]
pub enum FormulaSource<'a> {
    /// Formula text (XML)
    Text(&'a str),
    /// BIFF12 formula: `cce:u32 rgce cb:u32 extra`
    Biff12(&'a [u8]),
    /// Legacy formula: `cce` (u8 in BIFF2, u16 later), `rgce`, extra
    Biff {
        version: BiffVersion,
        data: &'a [u8],
    },
}

/// Turns formula payloads into token sequences
pub trait FormulaParser {
    /// Parse `source` relative to the cell at `base`.
    ///
    /// Returns `None` when the payload cannot be parsed.
    fn parse_formula(
        &self,
        base: CellAddress,
        context: FormulaContext,
        source: FormulaSource<'_>,
    ) -> Option<TokenSequence>;
}

/// Reference parser that wraps the payload without tokenizing it
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimFormulaParser;

impl VerbatimFormulaParser {
    fn parse_text(text: &str) -> Option<TokenSequence> {
        let text = text.trim();
        let text = text.strip_prefix('=').unwrap_or(text);
        if text.is_empty() {
            return None;
        }
        Some(TokenSequence::new(vec![FormulaToken::Expression(
            text.to_string(),
        )]))
    }

    fn parse_biff12(data: &[u8]) -> Option<TokenSequence> {
        let mut offset = 0;
        let cce = read_u32(data, &mut offset).ok()? as usize;
        let rgce = read_bytes(data, &mut offset, cce).ok()?;
        let mut tokens = vec![FormulaToken::Rgce(rgce.to_vec())];
        let cb = read_u32(data, &mut offset).unwrap_or(0) as usize;
        if cb > 0 {
            let extra = read_bytes(data, &mut offset, cb).ok()?;
            tokens.push(FormulaToken::Extra(extra.to_vec()));
        }
        Some(TokenSequence::new(tokens))
    }

    fn parse_biff(version: BiffVersion, data: &[u8]) -> Option<TokenSequence> {
        let mut offset = 0;
        let cce = match version {
            BiffVersion::Biff2 => read_u8(data, &mut offset).ok()? as usize,
            _ => read_u16(data, &mut offset).ok()? as usize,
        };
        let rgce = read_bytes(data, &mut offset, cce).ok()?;
        let mut tokens = vec![FormulaToken::Rgce(rgce.to_vec())];
        if offset < data.len() {
            tokens.push(FormulaToken::Extra(data[offset..].to_vec()));
        }
        Some(TokenSequence::new(tokens))
    }
}

impl FormulaParser for VerbatimFormulaParser {
    fn parse_formula(
        &self,
        _base: CellAddress,
        _context: FormulaContext,
        source: FormulaSource<'_>,
    ) -> Option<TokenSequence> {
        match source {
            FormulaSource::Text(text) => Self::parse_text(text),
            FormulaSource::Biff12(data) => Self::parse_biff12(data),
            FormulaSource::Biff { version, data } => Self::parse_biff(version, data),
        }
    }
}
