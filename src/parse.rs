use byteorder::{ByteOrder, LittleEndian};

use crate::codepage;
use crate::error::SampQueryError;

/// Borrow `len` bytes at index `offset` from `data`.
///
/// Fails instead of panicking when fewer than `len` bytes remain.
/// Mutates `offset` to the index after the slice.
pub fn get_bytes<'a>(
    data: &'a [u8],
    offset: &mut usize,
    len: usize,
    field: &str,
) -> Result<&'a [u8], SampQueryError> {
    let end = offset
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            SampQueryError::MalformedReply(format!(
                "{field}: need {len} bytes at offset {}, only {} available",
                *offset,
                data.len().saturating_sub(*offset)
            ))
        })?;
    let bytes = &data[*offset..end];
    *offset = end;
    Ok(bytes)
}

/// Get the [u8] at index `offset` from `data`.
///
/// Mutates `offset` to the index after the byte.
pub fn get_u8(data: &[u8], offset: &mut usize, field: &str) -> Result<u8, SampQueryError> {
    Ok(get_bytes(data, offset, 1, field)?[0])
}

/// Get 2 little-endian bytes (as a [u16]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u16(data: &[u8], offset: &mut usize, field: &str) -> Result<u16, SampQueryError> {
    Ok(LittleEndian::read_u16(get_bytes(data, offset, 2, field)?))
}

/// Get 4 little-endian bytes (as a [u32]) at index `offset` from `data`.
///
/// Mutates `offset` to the index after the bytes.
pub fn get_u32(data: &[u8], offset: &mut usize, field: &str) -> Result<u32, SampQueryError> {
    Ok(LittleEndian::read_u32(get_bytes(data, offset, 4, field)?))
}

/// Get `len` bytes of codepage text at index `offset` from `data`.
pub fn get_text(
    data: &[u8],
    offset: &mut usize,
    len: usize,
    field: &str,
) -> Result<String, SampQueryError> {
    Ok(codepage::decode(get_bytes(data, offset, len, field)?))
}
