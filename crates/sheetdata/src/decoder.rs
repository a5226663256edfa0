//! One decoder type over the three sheet-data dispatchers

use sheetdata_core::{DecodedEvent, Fragment, Result, SheetDataDecoder, SheetDataSink, SheetEnv};

#[cfg(feature = "xls")]
use sheetdata_core::BiffVersion;
#[cfg(feature = "xls")]
use sheetdata_xls::BiffSheetData;
#[cfg(feature = "xlsb")]
use sheetdata_xlsb::BinarySheetData;
#[cfg(feature = "xlsx")]
use sheetdata_xlsx::SheetDataContext;

use crate::Format;

/// A sheet-data decoder for any supported format.
///
/// Hosts that walk worksheet parts themselves create the variant matching
/// the part and feed it fragments through [`SheetDataDecoder::decode`].
pub enum Decoder<'a, S> {
    /// `sheetData` element events of an XML worksheet
    #[cfg(feature = "xlsx")]
    Xml(SheetDataContext<'a, S>),
    /// BIFF12 worksheet records
    #[cfg(feature = "xlsb")]
    Binary(BinarySheetData<'a, S>),
    /// BIFF2-BIFF8 worksheet records
    #[cfg(feature = "xls")]
    Legacy(BiffSheetData<'a, S>),
}

impl<'a, S: SheetDataSink> Decoder<'a, S> {
    #[cfg(feature = "xlsx")]
    pub fn xml(env: SheetEnv<'a>, sink: S) -> Self {
        Decoder::Xml(SheetDataContext::new(env, sink))
    }

    #[cfg(feature = "xlsb")]
    pub fn binary(env: SheetEnv<'a>, sink: S) -> Self {
        Decoder::Binary(BinarySheetData::new(env, sink))
    }

    /// Legacy decoder; `code_page` applies to byte strings whose font has no
    /// character set
    #[cfg(feature = "xls")]
    pub fn legacy(env: SheetEnv<'a>, version: BiffVersion, code_page: u16, sink: S) -> Self {
        Decoder::Legacy(BiffSheetData::new(env, version, code_page, sink))
    }

    /// The format this decoder reads
    pub fn format(&self) -> Format {
        match self {
            #[cfg(feature = "xlsx")]
            Decoder::Xml(_) => Format::Xlsx,
            #[cfg(feature = "xlsb")]
            Decoder::Binary(_) => Format::Xlsb,
            #[cfg(feature = "xls")]
            Decoder::Legacy(_) => Format::Xls,
        }
    }

    pub fn sink(&self) -> &S {
        match self {
            #[cfg(feature = "xlsx")]
            Decoder::Xml(d) => d.sink(),
            #[cfg(feature = "xlsb")]
            Decoder::Binary(d) => d.sink(),
            #[cfg(feature = "xls")]
            Decoder::Legacy(d) => d.sink(),
        }
    }

    /// Finish decoding and return the sink
    pub fn into_sink(self) -> S {
        match self {
            #[cfg(feature = "xlsx")]
            Decoder::Xml(d) => d.into_sink(),
            #[cfg(feature = "xlsb")]
            Decoder::Binary(d) => d.into_sink(),
            #[cfg(feature = "xls")]
            Decoder::Legacy(d) => d.into_sink(),
        }
    }
}

impl<S: SheetDataSink> SheetDataDecoder for Decoder<'_, S> {
    fn decode(&mut self, unit: Fragment<'_>) -> Result<DecodedEvent> {
        match self {
            #[cfg(feature = "xlsx")]
            Decoder::Xml(d) => d.decode(unit),
            #[cfg(feature = "xlsb")]
            Decoder::Binary(d) => d.decode(unit),
            #[cfg(feature = "xls")]
            Decoder::Legacy(d) => d.decode(unit),
        }
    }
}
