//! The dispatcher contract shared by all three formats

use crate::attributes::AttributeList;
use crate::error::Result;
use crate::formula::FormulaParser;
use crate::convert::AddressConverter;
use crate::styles::StyleLookup;

/// One unit of worksheet input delivered by a host walker
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    /// XML start element (local name)
    Start {
        element: &'a str,
        attributes: &'a AttributeList,
    },
    /// XML character data; may arrive split over several fragments
    Characters(&'a str),
    /// XML end element (local name)
    End { element: &'a str },
    /// Binary record with its body
    Record { id: u32, data: &'a [u8] },
}

/// What the dispatcher did with a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Deliver the element's children and its `End`
    Descend,
    /// Skip the element's children; its `End` must not be delivered
    Skip,
    /// Record consumed
    Handled,
    /// Fragment has no meaning in the current state
    Ignored,
}

/// A per-worksheet decoder fed one fragment at a time
pub trait SheetDataDecoder {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent>;
}

impl<D: SheetDataDecoder + ?Sized> SheetDataDecoder for Box<D> {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent> {
        (**self).decode(unit)
    }
}

/// Collaborators of one worksheet import
#[derive(Clone, Copy)]
pub struct SheetEnv<'a> {
    /// Sheet index inside the workbook
    pub sheet: u16,
    pub addresses: AddressConverter,
    pub formulas: &'a dyn FormulaParser,
    pub styles: &'a dyn StyleLookup,
}

impl<'a> SheetEnv<'a> {
    pub fn new(
        sheet: u16,
        addresses: AddressConverter,
        formulas: &'a dyn FormulaParser,
        styles: &'a dyn StyleLookup,
    ) -> Self {
        Self {
            sheet,
            addresses,
            formulas,
            styles,
        }
    }
}

impl std::fmt::Debug for SheetEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetEnv")
            .field("sheet", &self.sheet)
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}
