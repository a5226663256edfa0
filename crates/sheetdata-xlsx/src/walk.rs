//! Feeds quick-xml events to a [`SheetDataDecoder`]

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use sheetdata_core::{AttributeList, DecodedEvent, Fragment, SheetDataDecoder};

use crate::error::XlsxResult;

/// Collect the attributes of a start tag by local name
pub(crate) fn collect_attributes(e: &BytesStart<'_>) -> AttributeList {
    let mut attrs = AttributeList::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        if let Ok(value) = attr.unescape_value() {
            attrs.push(key, value.into_owned());
        }
    }
    attrs
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Walk an XML document and deliver its events to `decoder`.
///
/// Empty elements are delivered as a start followed by an end. Elements the
/// decoder answers with [`DecodedEvent::Skip`] are read past without
/// delivering their content or end tag.
pub fn decode_xml<R: BufRead, D: SheetDataDecoder + ?Sized>(
    input: R,
    decoder: &mut D,
) -> XlsxResult<()> {
    let mut xml_reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = local_name(&e);
                let attributes = collect_attributes(&e);
                let event = decoder.decode(Fragment::Start {
                    element: &element,
                    attributes: &attributes,
                })?;
                if event == DecodedEvent::Skip {
                    let end = e.to_end().into_owned();
                    xml_reader.read_to_end_into(end.name(), &mut skip_buf)?;
                    skip_buf.clear();
                }
            }
            Event::Empty(e) => {
                let element = local_name(&e);
                let attributes = collect_attributes(&e);
                let event = decoder.decode(Fragment::Start {
                    element: &element,
                    attributes: &attributes,
                })?;
                if event == DecodedEvent::Descend {
                    decoder.decode(Fragment::End { element: &element })?;
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                decoder.decode(Fragment::Characters(&text))?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e);
                decoder.decode(Fragment::Characters(&text))?;
            }
            Event::End(e) => {
                let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                decoder.decode(Fragment::End { element: &element })?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
