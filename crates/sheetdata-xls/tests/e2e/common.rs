//! Common utilities for E2E tests.

use std::io::{Cursor, Write};

use sheetdata_xls::biff::records;
use tempfile::NamedTempFile;

/// BIFF5/BIFF8 BOF record id
pub const BOF: u16 = 0x0809;
pub const BOF_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;

/// Assembles a BIFF record stream
#[derive(Default)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
    body: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.body.push(v);
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.body.extend(v.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.body.extend_from_slice(v);
        self
    }

    /// BIFF8 string: 16-bit length, compressed characters
    pub fn unicode(&mut self, text: &str) -> &mut Self {
        self.u16(text.len() as u16).u8(0).bytes(text.as_bytes())
    }

    /// Row, column and XF index of a BIFF3+ cell record
    pub fn cell(&mut self, row: u16, col: u16, xf: u16) -> &mut Self {
        self.u16(row).u16(col).u16(xf)
    }

    /// BIFF8 formula fields after the cell header: cached number, flags,
    /// chain and the token array
    pub fn formula(&mut self, cached: f64, rgce: &[u8]) -> &mut Self {
        self.f64(cached)
            .u16(0)
            .u32(0)
            .u16(rgce.len() as u16)
            .bytes(rgce)
    }

    /// Emit the fields collected so far as one record
    pub fn record(&mut self, id: u16) -> &mut Self {
        self.bytes.extend(id.to_le_bytes());
        self.bytes.extend((self.body.len() as u16).to_le_bytes());
        self.bytes.append(&mut self.body);
        self
    }

    /// BOF of a BIFF5/BIFF8 substream
    pub fn bof(&mut self, version: u16, substream: u16) -> &mut Self {
        self.u16(version).u16(substream).u32(0).u32(0).u32(0).record(BOF)
    }

    /// Append complete records
    pub fn raw(&mut self, records: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(records);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The records emitted so far, without an EOF
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        self.record(records::EOF);
        std::mem::take(&mut self.bytes)
    }
}

/// A BIFF8 worksheet substream
pub fn biff8_sheet(build: impl FnOnce(&mut StreamBuilder)) -> Vec<u8> {
    let mut b = StreamBuilder::new();
    b.bof(0x0600, BOF_WORKSHEET);
    build(&mut b);
    b.finish()
}

/// Build a BIFF8 workbook stream with `sheets` (name, substream) and a
/// shared-string table
pub fn build_biff8_stream(sheets: &[(&str, Vec<u8>)], shared_strings: &[&str]) -> Vec<u8> {
    let mut sst = StreamBuilder::new();
    let count = shared_strings.len() as u32;
    sst.u32(count).u32(count);
    for s in shared_strings {
        sst.unicode(s);
    }
    sst.record(records::SST);
    build_biff8_stream_with_sst(sheets, &sst.take())
}

/// Build a BIFF8 workbook stream whose globals end with the given SST
/// records
pub fn build_biff8_stream_with_sst(sheets: &[(&str, Vec<u8>)], sst: &[u8]) -> Vec<u8> {
    let mut globals = StreamBuilder::new();
    globals.bof(0x0600, BOF_GLOBALS);
    globals.u16(1200).record(records::CODEPAGE);

    let mut offset_fields = Vec::new();
    for (name, _) in sheets {
        offset_fields.push(globals.len() + 4);
        globals
            .u32(0)
            .u8(0)
            .u8(0)
            .u8(name.len() as u8)
            .u8(0)
            .bytes(name.as_bytes())
            .record(records::BOUNDSHEET);
    }

    globals.raw(sst);
    let mut stream = globals.finish();

    for ((_, sheet), field) in sheets.iter().zip(offset_fields) {
        let offset = (stream.len() as u32).to_le_bytes();
        stream[field..field + 4].copy_from_slice(&offset);
        stream.extend_from_slice(sheet);
    }
    stream
}

/// Wrap a workbook stream in a compound file under `stream_name`
pub fn compound_file(stream_name: &str, stream: &[u8]) -> Vec<u8> {
    let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut s = comp.create_stream(stream_name).unwrap();
        s.write_all(stream).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}

/// Save `bytes` to a temp file with the given extension
pub fn temp_file(bytes: &[u8], extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
