//! Scalar building blocks of the wire format
//!
//! Every message is a flat sequence of fixed-width little-endian scalars,
//! length-prefixed strings and one-byte markers for optional sections.
//!
//! # Strings
//!
//! ```text
//! ┌──────────────┬──────────────────────┬──────┐
//! │ 4 bytes (LE) │ len - 1 bytes        │ 0x00 │
//! │ len          │ UTF-8 payload        │ NUL  │
//! └──────────────┴──────────────────────┴──────┘
//! ```
//!
//! The length counts the trailing NUL. An absent string is written as a
//! zero length with no payload, so `Some("")` (length 1) and `None`
//! (length 0) stay distinguishable.
//!
//! Decoders advance the cursor and never read past the end of the buffer.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::Result;
use crate::error::ProtocolError;

/// Marker byte for an absent optional section
pub const MARKER_ABSENT: u8 = 0;

/// Marker byte for a present optional section
pub const MARKER_PRESENT: u8 = 1;

/// Serialization contract shared by every packed message type
///
/// Field order is declared once, in `encode` and mirrored in `decode`.
pub trait WireFormat: Sized {
    /// Append the packed representation to `buf`
    fn encode(&self, buf: &mut BytesMut);

    /// Read one value from the front of `buf`, advancing it
    fn decode(buf: &mut Bytes) -> Result<Self>;

    /// Pack into a freshly allocated buffer
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64);
        self.encode(&mut buf);
        buf.freeze()
    }
}

// ============================================================================
// Encoding
// ============================================================================

#[inline]
pub fn put_u8(buf: &mut BytesMut, v: u8) {
    buf.put_u8(v);
}

#[inline]
pub fn put_u64(buf: &mut BytesMut, v: u64) {
    buf.put_u64_le(v);
}

#[inline]
pub fn put_i32(buf: &mut BytesMut, v: i32) {
    buf.put_i32_le(v);
}

#[inline]
pub fn put_f64(buf: &mut BytesMut, v: f64) {
    buf.put_f64_le(v);
}

/// Write a length-prefixed, NUL-terminated string (length 0 when absent)
pub fn put_str(buf: &mut BytesMut, s: Option<&str>) {
    match s {
        Some(s) => {
            // saturates; a frame that large is refused by `Frame::encode`
            let len = u32::try_from(s.len() + 1).unwrap_or(u32::MAX);
            buf.put_u32_le(len);
            buf.put_slice(s.as_bytes());
            buf.put_u8(0);
        }
        None => buf.put_u32_le(0),
    }
}

/// Write an optional-section marker
#[inline]
pub fn put_marker(buf: &mut BytesMut, present: bool) {
    buf.put_u8(if present { MARKER_PRESENT } else { MARKER_ABSENT });
}

// ============================================================================
// Decoding
// ============================================================================

#[inline]
fn ensure(buf: &Bytes, field: &'static str, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(ProtocolError::truncated(field, needed, buf.remaining()));
    }
    Ok(())
}

pub fn get_u8(buf: &mut Bytes, field: &'static str) -> Result<u8> {
    ensure(buf, field, 1)?;
    Ok(buf.get_u8())
}

pub fn get_u64(buf: &mut Bytes, field: &'static str) -> Result<u64> {
    ensure(buf, field, 8)?;
    Ok(buf.get_u64_le())
}

pub fn get_i32(buf: &mut Bytes, field: &'static str) -> Result<i32> {
    ensure(buf, field, 4)?;
    Ok(buf.get_i32_le())
}

pub fn get_f64(buf: &mut Bytes, field: &'static str) -> Result<f64> {
    ensure(buf, field, 8)?;
    Ok(buf.get_f64_le())
}

/// Read a length-prefixed string; a zero length yields `None`
pub fn get_str(buf: &mut Bytes, field: &'static str) -> Result<Option<String>> {
    ensure(buf, field, 4)?;
    let len = buf.get_u32_le() as usize;
    if len == 0 {
        return Ok(None);
    }
    ensure(buf, field, len)?;

    let raw = buf.split_to(len);
    let Some((&0, text)) = raw.split_last() else {
        return Err(ProtocolError::invalid_string(field, "missing NUL terminator"));
    };

    let text = std::str::from_utf8(text)
        .map_err(|_| ProtocolError::invalid_string(field, "not valid UTF-8"))?;
    Ok(Some(text.to_owned()))
}

/// Read an optional-section marker
pub fn get_marker(buf: &mut Bytes, field: &'static str) -> Result<bool> {
    match get_u8(buf, field)? {
        MARKER_ABSENT => Ok(false),
        MARKER_PRESENT => Ok(true),
        value => Err(ProtocolError::InvalidMarker { field, value }),
    }
}

/// Decode values back to back until `buf` is exhausted
pub fn decode_all<T: WireFormat>(mut buf: Bytes) -> Result<Vec<T>> {
    let mut values = Vec::new();
    while buf.has_remaining() {
        values.push(T::decode(&mut buf)?);
    }
    Ok(values)
}
