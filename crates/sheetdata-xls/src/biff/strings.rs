//! Legacy BIFF string decoding.
//!
//! BIFF2 to BIFF5 store byte strings in a code page:
//! - Header: length (1 byte for BIFF2 cell records and short strings,
//!   2 bytes otherwise)
//! - Then the bytes, decoded with the code page of the cell's font or the
//!   workbook CODEPAGE record
//!
//! BIFF8 strings have a more complex encoding:
//! - Header: char_count (2 bytes) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each) if fRichSt
//! - Then the extended data if fExtSt
//!
//! In SST records, strings can span CONTINUE records. The CONTINUE record
//! can change the encoding (compressed ↔ uncompressed) mid-string via a
//! new flags byte at the start of the continuation.

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, IBM866, MACINTOSH, SHIFT_JIS, UTF_8, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258, WINDOWS_874,
};
use sheetdata_core::binary::{read_bytes, read_u16, read_u32, read_u8, skip};
use sheetdata_core::{Error, Result, RichString};

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_EXT: u8 = 0x04;
const FLAG_RICH: u8 = 0x08;

/// Default code page of workbooks without a CODEPAGE record
pub const DEFAULT_CODE_PAGE: u16 = 1252;

/// A BIFF8 string with its formatting runs as (first character, font index)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BiffString {
    pub text: String,
    pub runs: Vec<(u16, u16)>,
}

impl BiffString {
    /// The string as a finalized rich string
    pub fn to_rich_string(&self) -> RichString {
        let units: Vec<u16> = self.text.encode_utf16().collect();
        let portions: Vec<(usize, u16)> = self
            .runs
            .iter()
            .map(|&(first, font)| (first as usize, font))
            .collect();
        RichString::from_font_portions(&units, &portions)
    }
}

/// The `encoding_rs` encoding of a Windows code page
pub fn encoding_for_code_page(code_page: u16) -> Option<&'static Encoding> {
    Some(match code_page {
        367 | 1252 | 0x8001 => WINDOWS_1252,
        866 => IBM866,
        874 => WINDOWS_874,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        1250 => WINDOWS_1250,
        1251 => WINDOWS_1251,
        1253 => WINDOWS_1253,
        1254 => WINDOWS_1254,
        1255 => WINDOWS_1255,
        1256 => WINDOWS_1256,
        1257 => WINDOWS_1257,
        1258 => WINDOWS_1258,
        10000 | 0x8000 => MACINTOSH,
        65001 => UTF_8,
        _ => return None,
    })
}

/// Decode bytes in `code_page`.
///
/// Unknown code pages map each byte to the character of the same value.
pub fn decode_bytes(bytes: &[u8], code_page: u16) -> String {
    match encoding_for_code_page(code_page) {
        Some(encoding) => encoding.decode_without_bom_handling(bytes).0.into_owned(),
        None => {
            log::debug!("code page {} not supported, mapping bytes directly", code_page);
            bytes.iter().copied().map(char::from).collect()
        }
    }
}

/// Read a byte string with an 8-bit (`wide_length == false`) or 16-bit length
pub fn read_byte_string(
    data: &[u8],
    offset: &mut usize,
    wide_length: bool,
    code_page: u16,
) -> Result<String> {
    let len = if wide_length {
        read_u16(data, offset)? as usize
    } else {
        read_u8(data, offset)? as usize
    };
    let bytes = read_bytes(data, offset, len)?;
    Ok(decode_bytes(bytes, code_page))
}

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET etc.).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> Result<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_character_data(data, offset, char_count, flags, &[])
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (LABEL, STRING etc.).
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> Result<BiffString> {
    read_continued_string(data, offset, &[])
}

/// Read a BIFF8 Unicode string whose character data may be split at the
/// CONTINUE boundaries `continues` (offsets into `data`).
pub fn read_continued_string(
    data: &[u8],
    offset: &mut usize,
    continues: &[usize],
) -> Result<BiffString> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & FLAG_RICH != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & FLAG_EXT != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_character_data(data, offset, char_count, flags, continues)?;

    let mut runs = Vec::with_capacity(run_count);
    for _ in 0..run_count {
        let first = read_u16(data, offset)?;
        let font = read_u16(data, offset)?;
        runs.push((first, font));
    }
    skip(data, offset, ext_size)?;

    Ok(BiffString { text, runs })
}

/// Read `char_count` characters, re-reading the flags byte at the start of
/// every continuation the characters cross.
fn read_character_data(
    data: &[u8],
    offset: &mut usize,
    char_count: usize,
    mut flags: u8,
    continues: &[usize],
) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(char_count);
    while units.len() < char_count {
        if continues.contains(offset) {
            flags = read_u8(data, offset)?;
        }
        let limit = continues
            .iter()
            .copied()
            .find(|&b| b > *offset)
            .unwrap_or(data.len());
        let remaining = char_count - units.len();

        if flags & FLAG_HIGH_BYTE != 0 {
            let take = remaining.min((limit - *offset) / 2);
            if take == 0 {
                return Err(truncated(*offset, remaining * 2));
            }
            let bytes = read_bytes(data, offset, take * 2)?;
            units.extend(
                bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]])),
            );
        } else {
            let take = remaining.min(limit - *offset);
            if take == 0 {
                return Err(truncated(*offset, remaining));
            }
            let bytes = read_bytes(data, offset, take)?;
            units.extend(bytes.iter().map(|&b| b as u16));
        }
    }
    String::from_utf16(&units).map_err(|e| Error::InvalidUtf16(e.to_string()))
}

fn truncated(offset: usize, needed: usize) -> Error {
    Error::Truncated { offset, needed }
}

/// Parse the SST (Shared String Table) from the SST body merged with its
/// CONTINUE bodies, `continues` holding the offsets where each continuation
/// starts.
///
/// The SST body starts with:
/// - `total_strings` (4 bytes, u32): total string refs in workbook
/// - `unique_strings` (4 bytes, u32): number of unique strings in this table
/// - Then `unique_strings` Unicode string entries
pub fn parse_sst(data: &[u8], continues: &[usize]) -> Result<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));

    for i in 0..unique_count {
        match read_continued_string(data, &mut offset, continues) {
            Ok(s) => strings.push(s.text),
            Err(e) => {
                // Some XLS files have SST padding or truncation issues.
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
