//! BIFF (Binary Interchange File Format) handling.
//!
//! This module provides the record-level abstraction for reading BIFF2-BIFF8
//! streams. A BIFF stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//!
//! CONTINUE records (type 0x003C) extend the body of the preceding record
//! beyond the per-record size limit.

pub mod records;
pub mod strings;

use std::ops::Range;

use sheetdata_core::{BiffVersion, Fragment, SheetDataDecoder};

use crate::error::{XlsError, XlsResult};

/// A single BIFF record (with CONTINUE bodies already merged).
#[derive(Debug)]
pub struct BiffRecord {
    /// Record type ID (e.g. `records::SST`, `records::RK`).
    pub record_type: u16,
    /// Record body bytes (CONTINUE records have been concatenated).
    pub data: Vec<u8>,
    /// Offsets in `data` where each merged CONTINUE body starts.
    pub continues: Vec<usize>,
    /// Byte offset of this record's header in the stream.
    pub stream_offset: u64,
}

impl BiffRecord {
    /// Whether this is a BOF record of any BIFF version
    pub fn is_bof(&self) -> bool {
        BiffVersion::is_bof(self.record_type)
    }
}

/// Reads all records from a BIFF stream, merging CONTINUE records
/// into their parent.
///
/// A stream ending inside a record header is treated as ending before it;
/// a stream ending inside a record body is an error.
pub fn read_all_records(stream: &[u8]) -> XlsResult<Vec<BiffRecord>> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut pos = 0usize;

    while pos + 4 <= stream.len() {
        let stream_offset = pos as u64;
        let record_type = u16::from_le_bytes([stream[pos], stream[pos + 1]]);
        let body_len = u16::from_le_bytes([stream[pos + 2], stream[pos + 3]]) as usize;
        pos += 4;

        let body = stream.get(pos..pos + body_len).ok_or_else(|| {
            XlsError::InvalidFormat(format!(
                "record 0x{record_type:04X} at offset {stream_offset} runs past the end of the stream"
            ))
        })?;
        pos += body_len;

        if record_type == records::CONTINUE {
            // Append to the previous record's data
            match records.last_mut() {
                Some(prev) => {
                    prev.continues.push(prev.data.len());
                    prev.data.extend_from_slice(body);
                }
                None => log::debug!("dropping CONTINUE record without a parent"),
            }
        } else {
            records.push(BiffRecord {
                record_type,
                data: body.to_vec(),
                continues: Vec::new(),
                stream_offset,
            });
        }
    }

    if pos < stream.len() {
        log::debug!("ignoring {} trailing bytes", stream.len() - pos);
    }

    Ok(records)
}

/// Split records into substreams, each running from a BOF record to its EOF,
/// returned as index ranges into `records`.
///
/// Records outside any substream are dropped. Nested substreams (charts
/// embedded in a worksheet) stay inside their parent.
pub fn split_substreams(records: &[BiffRecord]) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = None;
    let mut depth = 0usize;

    for (idx, rec) in records.iter().enumerate() {
        if rec.is_bof() {
            if depth == 0 {
                start = Some(idx);
            }
            depth += 1;
        } else if rec.record_type == records::EOF && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(first) = start.take() {
                    groups.push(first..idx + 1);
                }
            }
        }
    }

    // An unterminated last substream still counts
    if let Some(first) = start {
        groups.push(first..records.len());
    }

    groups
}

/// The substream type field of a BIFF5/BIFF8 BOF record
pub fn substream_type(bof: &BiffRecord) -> Option<u16> {
    let data = bof.data.get(2..4)?;
    Some(u16::from_le_bytes([data[0], data[1]]))
}

/// Deliver the records of one substream to `decoder`
pub fn decode_records<D: SheetDataDecoder + ?Sized>(
    records: &[BiffRecord],
    decoder: &mut D,
) -> XlsResult<()> {
    for rec in records {
        decoder.decode(Fragment::Record {
            id: rec.record_type as u32,
            data: &rec.data,
        })?;
    }
    Ok(())
}
