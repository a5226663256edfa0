//! BIFF12 record framing
//!
//! Every record is a variable-length id, a variable-length payload size and
//! the payload itself.

use std::io::{self, BufReader, Read, Write};

use sheetdata_core::{Fragment, SheetDataDecoder};

use crate::error::XlsbResult;

const MAX_RECORD_ID_BYTES: usize = 4;
const MAX_RECORD_LEN_BYTES: usize = 4;
const MAX_RECORD_LEN: u32 = 0x0FFF_FFFF;

fn unexpected_eof(context: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, context)
}

fn read_byte(r: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Read a record id.
///
/// The id bytes form a little-endian integer whose bytes keep their high
/// bit, which doubles as the continuation flag.
///
/// Returns `Ok(None)` at end of stream.
pub fn read_record_id(r: &mut impl Read) -> io::Result<Option<u32>> {
    let mut v: u32 = 0;
    for i in 0..MAX_RECORD_ID_BYTES {
        let byte = match read_byte(r)? {
            Some(byte) => byte,
            None if i == 0 => return Ok(None),
            None => return Err(unexpected_eof("end of stream inside a record id")),
        };
        v |= (byte as u32) << (8 * i);
        if byte & 0x80 == 0 {
            return Ok(Some(v));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "record id longer than 4 bytes",
    ))
}

/// Read a record payload size (7-bit groups, least significant first).
///
/// Returns `Ok(None)` at end of stream.
pub fn read_record_len(r: &mut impl Read) -> io::Result<Option<u32>> {
    let mut v: u32 = 0;
    for i in 0..MAX_RECORD_LEN_BYTES {
        let byte = match read_byte(r)? {
            Some(byte) => byte,
            None if i == 0 => return Ok(None),
            None => return Err(unexpected_eof("end of stream inside a record size")),
        };
        v |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some(v));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "record size longer than 4 bytes",
    ))
}

/// Write a record id, mirroring [`read_record_id`]
pub fn write_record_id(w: &mut impl Write, id: u32) -> io::Result<()> {
    let bytes = id.to_le_bytes();
    let mut n = 1usize;
    while n < MAX_RECORD_ID_BYTES && (bytes[n - 1] & 0x80) != 0 {
        n += 1;
    }
    if (n == MAX_RECORD_ID_BYTES && (bytes[3] & 0x80) != 0) || bytes[n..].iter().any(|&b| b != 0)
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "record id cannot be encoded",
        ));
    }
    w.write_all(&bytes[..n])
}

/// Write a record payload size, mirroring [`read_record_len`]
pub fn write_record_len(w: &mut impl Write, mut len: u32) -> io::Result<()> {
    if len > MAX_RECORD_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "record size exceeds 28 bits",
        ));
    }
    loop {
        let mut byte = (len & 0x7F) as u8;
        len >>= 7;
        if len != 0 {
            byte |= 0x80;
        }
        w.write_all(&[byte])?;
        if len == 0 {
            return Ok(());
        }
    }
}

/// Write one complete record
pub fn write_record(w: &mut impl Write, id: u32, data: &[u8]) -> io::Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record too large"))?;
    write_record_id(w, id)?;
    write_record_len(w, len)?;
    w.write_all(data)
}

/// Reads records one at a time, reusing a single payload buffer
pub struct RecordReader<R: Read> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// The next record id and payload, or `None` at end of stream
    pub fn next_record(&mut self) -> XlsbResult<Option<(u32, &[u8])>> {
        let Some(id) = read_record_id(&mut self.inner)? else {
            return Ok(None);
        };
        let Some(len) = read_record_len(&mut self.inner)? else {
            return Err(unexpected_eof("end of stream before record size").into());
        };
        self.buf.clear();
        self.buf.resize(len as usize, 0);
        self.inner.read_exact(&mut self.buf)?;
        Ok(Some((id, &self.buf)))
    }
}

/// Deliver every record of `input` to `decoder`
pub fn decode_records<R: Read, D: SheetDataDecoder + ?Sized>(
    input: R,
    decoder: &mut D,
) -> XlsbResult<()> {
    let mut reader = RecordReader::new(input);
    while let Some((id, data)) = reader.next_record()? {
        decoder.decode(Fragment::Record { id, data })?;
    }
    Ok(())
}
