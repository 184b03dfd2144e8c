//! Codec utilities for TDS protocol encoding and decoding.
//!
//! This module provides low-level encoding and decoding utilities used
//! throughout the TDS protocol implementation.

use bytes::{Buf, BufMut, Bytes};

use crate::error::ProtocolError;
use crate::prelude::*;

/// Read a single byte, or signal that more bytes are needed.
///
/// This is the building block the token decoders use for the resumable
/// parsing model: on `Err`, `src` is left untouched so a caller holding the
/// original buffer can append bytes and retry the whole decode from
/// scratch.
pub fn try_get_u8(src: &mut Bytes) -> Result<u8, ProtocolError> {
    if src.remaining() < 1 {
        return Err(ProtocolError::NotEnoughBytes { needed: 1 });
    }
    Ok(src.get_u8())
}

/// Read a little-endian `u16`, or signal that more bytes are needed.
pub fn try_get_u16_le(src: &mut Bytes) -> Result<u16, ProtocolError> {
    if src.remaining() < 2 {
        return Err(ProtocolError::NotEnoughBytes { needed: 2 });
    }
    Ok(src.get_u16_le())
}

/// Read a little-endian `u32`, or signal that more bytes are needed.
pub fn try_get_u32_le(src: &mut Bytes) -> Result<u32, ProtocolError> {
    if src.remaining() < 4 {
        return Err(ProtocolError::NotEnoughBytes { needed: 4 });
    }
    Ok(src.get_u32_le())
}

/// Read a little-endian `i32`, or signal that more bytes are needed.
pub fn try_get_i32_le(src: &mut Bytes) -> Result<i32, ProtocolError> {
    if src.remaining() < 4 {
        return Err(ProtocolError::NotEnoughBytes { needed: 4 });
    }
    Ok(src.get_i32_le())
}

/// Split off and return `len` raw bytes, or signal that more are needed.
pub fn try_get_bytes(src: &mut Bytes, len: usize) -> Result<Bytes, ProtocolError> {
    if src.remaining() < len {
        return Err(ProtocolError::NotEnoughBytes { needed: len - src.remaining() });
    }
    Ok(src.copy_to_bytes(len))
}

/// Read a 1-byte-length-prefixed UTF-16LE string, or signal that more bytes
/// are needed.
///
/// `src` is left untouched on `Err`, including when the length prefix
/// itself was buffered but the string body was not.
pub fn try_read_b_varchar(src: &mut Bytes) -> Result<String, ProtocolError> {
    let checkpoint = src.clone();
    let len = try_get_u8(src)? as usize;
    match try_read_utf16_string(src, len) {
        Ok(s) => Ok(s),
        Err(e) => {
            *src = checkpoint;
            Err(e)
        }
    }
}

/// Read a 2-byte-length-prefixed UTF-16LE string, or signal that more bytes
/// are needed.
pub fn try_read_us_varchar(src: &mut Bytes) -> Result<String, ProtocolError> {
    let checkpoint = src.clone();
    let len = try_get_u16_le(src)? as usize;
    match try_read_utf16_string(src, len) {
        Ok(s) => Ok(s),
        Err(e) => {
            *src = checkpoint;
            Err(e)
        }
    }
}

/// Read a UTF-16LE string of `char_count` characters, or signal that more
/// bytes are needed.
pub fn try_read_utf16_string(src: &mut Bytes, char_count: usize) -> Result<String, ProtocolError> {
    let byte_count = char_count * 2;
    if src.remaining() < byte_count {
        return Err(ProtocolError::NotEnoughBytes {
            needed: byte_count - src.remaining(),
        });
    }
    let mut chars = Vec::with_capacity(char_count);
    for _ in 0..char_count {
        chars.push(src.get_u16_le());
    }
    String::from_utf16(&chars).map_err(|_| ProtocolError::InvalidString)
}

/// Read a length-prefixed UTF-16LE string.
///
/// The format is: 1-byte length (in characters) followed by UTF-16LE bytes.
pub fn read_b_varchar(src: &mut impl Buf) -> Option<String> {
    if src.remaining() < 1 {
        return None;
    }
    let len = src.get_u8() as usize;
    read_utf16_string(src, len)
}

/// Read a length-prefixed UTF-16LE string with 2-byte length.
///
/// The format is: 2-byte length (in characters) followed by UTF-16LE bytes.
pub fn read_us_varchar(src: &mut impl Buf) -> Option<String> {
    if src.remaining() < 2 {
        return None;
    }
    let len = src.get_u16_le() as usize;
    read_utf16_string(src, len)
}

/// Read a UTF-16LE string of specified character length.
pub fn read_utf16_string(src: &mut impl Buf, char_count: usize) -> Option<String> {
    let byte_count = char_count * 2;
    if src.remaining() < byte_count {
        return None;
    }

    let mut chars = Vec::with_capacity(char_count);
    for _ in 0..char_count {
        chars.push(src.get_u16_le());
    }

    String::from_utf16(&chars).ok()
}

/// Write a length-prefixed UTF-16LE string (1-byte length).
pub fn write_b_varchar(dst: &mut impl BufMut, s: &str) {
    let chars: Vec<u16> = s.encode_utf16().collect();
    let len = chars.len().min(255) as u8;
    dst.put_u8(len);
    for &c in &chars[..len as usize] {
        dst.put_u16_le(c);
    }
}

/// Write a length-prefixed UTF-16LE string (2-byte length).
pub fn write_us_varchar(dst: &mut impl BufMut, s: &str) {
    let chars: Vec<u16> = s.encode_utf16().collect();
    let len = chars.len().min(65535) as u16;
    dst.put_u16_le(len);
    for &c in &chars[..len as usize] {
        dst.put_u16_le(c);
    }
}

/// Write a UTF-16LE string without length prefix.
pub fn write_utf16_string(dst: &mut impl BufMut, s: &str) {
    for c in s.encode_utf16() {
        dst.put_u16_le(c);
    }
}

/// Read a null-terminated ASCII string.
pub fn read_null_terminated_ascii(src: &mut impl Buf) -> Option<String> {
    let mut bytes = Vec::new();
    while src.has_remaining() {
        let b = src.get_u8();
        if b == 0 {
            break;
        }
        bytes.push(b);
    }
    String::from_utf8(bytes).ok()
}

/// Calculate the byte length of a UTF-16 encoded string.
#[must_use]
pub fn utf16_byte_len(s: &str) -> usize {
    s.encode_utf16().count() * 2
}
