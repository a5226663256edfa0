//! Little-endian field readers shared by the binary record formats.
//!
//! Every reader takes the record body and a cursor offset, advances the
//! offset on success and returns [`Error::Truncated`] when the body ends early.

use crate::error::{Error, Result};

#[inline]
fn take<'a>(data: &'a [u8], offset: &mut usize, needed: usize) -> Result<&'a [u8]> {
    let end = offset.checked_add(needed).filter(|end| *end <= data.len());
    match end {
        Some(end) => {
            let bytes = &data[*offset..end];
            *offset = end;
            Ok(bytes)
        }
        None => Err(Error::Truncated {
            offset: *offset,
            needed,
        }),
    }
}

/// Read a `u8` from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8> {
    Ok(take(data, offset, 1)?[0])
}

/// Read a `u16` (little-endian) from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16> {
    let b = take(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Read a `u32` (little-endian) from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
    let b = take(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read an `i32` (little-endian).
#[inline]
pub fn read_i32(data: &[u8], offset: &mut usize) -> Result<i32> {
    read_u32(data, offset).map(|v| v as i32)
}

/// Read an `f64` (IEEE 754 double, little-endian) from a byte slice.
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> Result<f64> {
    let b = take(data, offset, 8)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(b);
    Ok(f64::from_le_bytes(bytes))
}

/// Borrow `len` raw bytes, advancing `offset`.
#[inline]
pub fn read_bytes<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    take(data, offset, len)
}

/// Advance `offset` by `len` bytes without reading them.
#[inline]
pub fn skip(data: &[u8], offset: &mut usize, len: usize) -> Result<()> {
    take(data, offset, len).map(|_| ())
}

/// Read `count` UTF-16LE code units and decode them.
pub fn read_utf16(data: &[u8], offset: &mut usize, count: usize) -> Result<String> {
    let needed = count.checked_mul(2).ok_or(Error::Truncated {
        offset: *offset,
        needed: usize::MAX,
    })?;
    let bytes = take(data, offset, needed)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| Error::InvalidUtf16(e.to_string()))
}

/// Decode an RK-encoded number.
///
/// RK encoding (4 bytes):
/// - Bit 0: if 1, the decoded number should be divided by 100
/// - Bit 1: if 1, value is an integer (bits 2..31 as signed 30-bit int)
///           if 0, value is an IEEE 754 double (bits 2..31 are the upper 30 bits,
///           lower 34 bits of the double are zero)
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        let upper = (rk & 0xFFFF_FFFC) as u64;
        f64::from_bits(upper << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Read an RK value from 4 bytes at `offset`.
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> Result<f64> {
    let raw = read_u32(data, offset)?;
    Ok(decode_rk(raw))
}
