//! BIFF12 string structures

use sheetdata_core::binary::{read_bytes, read_i32, read_u16, read_u32, read_u8, read_utf16};
use sheetdata_core::{Result, RichString};

const STRING_FLAG_FONTS: u8 = 0x01;

const NULL_STRING: u32 = 0xFFFF_FFFF;

/// Read a wide string: character count followed by UTF-16 code units
pub fn read_wide_string(data: &[u8], offset: &mut usize) -> Result<String> {
    let count = read_u32(data, offset)? as usize;
    read_utf16(data, offset, count)
}

/// Read a wide string whose count may be the null marker
pub fn read_nullable_wide_string(data: &[u8], offset: &mut usize) -> Result<Option<String>> {
    let count = read_u32(data, offset)?;
    if count == NULL_STRING {
        return Ok(None);
    }
    read_utf16(data, offset, count as usize).map(Some)
}

/// Read a rich string: flags byte, text, and with the font flag set the
/// formatting runs as (first character, font id) pairs.
///
/// Phonetic data following the runs is not read.
pub fn read_rich_string(data: &[u8], offset: &mut usize) -> Result<RichString> {
    let flags = read_u8(data, offset)?;
    let count = read_u32(data, offset)? as usize;
    let bytes = read_bytes(data, offset, count.saturating_mul(2))?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let mut portions = Vec::new();
    if flags & STRING_FLAG_FONTS != 0 && *offset < data.len() {
        let run_count = read_i32(data, offset)?.max(0);
        for _ in 0..run_count {
            let first = read_u16(data, offset)? as usize;
            let font = read_u16(data, offset)?;
            portions.push((first, font));
        }
    }

    Ok(RichString::from_font_portions(&units, &portions))
}
