//! Tagged scalar values carried by tasks and results
//!
//! # Wire Format
//!
//! ```text
//! tag(u8) · payload
//!   0 NONE  -> no payload
//!   1 STR   -> string
//!   2 DBL   -> f64
//!   3 UI64  -> u64
//! ```

use bytes::{Bytes, BytesMut};

use crate::Result;
use crate::codec::{get_f64, get_str, get_u8, get_u64, put_f64, put_str, put_u8, put_u64};
use crate::error::ProtocolError;

pub const TAG_NONE: u8 = 0;
pub const TAG_STR: u8 = 1;
pub const TAG_DBL: u8 = 2;
pub const TAG_UI64: u8 = 3;

/// Raw or transformed value of a preprocessing task
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Uint64(u64),
    Double(f64),
    Str(String),
}

impl Variant {
    #[inline]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Uint64(_) => TAG_UI64,
            Self::Double(_) => TAG_DBL,
            Self::Str(_) => TAG_STR,
        }
    }

    /// Numeric view of this value, `None` for strings
    pub fn as_numeric(&self) -> Option<NumericValue> {
        match self {
            Self::Uint64(v) => Some(NumericValue::Uint64(*v)),
            Self::Double(v) => Some(NumericValue::Double(*v)),
            Self::Str(_) => None,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        put_u8(buf, self.tag());
        match self {
            Self::Uint64(v) => put_u64(buf, *v),
            Self::Double(v) => put_f64(buf, *v),
            // a string variant always has a payload
            Self::Str(s) => put_str(buf, Some(s)),
        }
    }

    /// Encode an optional variant, writing the NONE tag when absent
    pub(crate) fn encode_opt(value: Option<&Self>, buf: &mut BytesMut) {
        match value {
            Some(v) => v.encode(buf),
            None => put_u8(buf, TAG_NONE),
        }
    }

    pub(crate) fn decode_opt(buf: &mut Bytes, field: &'static str) -> Result<Option<Self>> {
        let value = match get_u8(buf, field)? {
            TAG_NONE => return Ok(None),
            TAG_UI64 => Self::Uint64(get_u64(buf, field)?),
            TAG_DBL => Self::Double(get_f64(buf, field)?),
            TAG_STR => Self::Str(get_str(buf, field)?.unwrap_or_default()),
            tag => return Err(ProtocolError::invalid_variant(field, tag)),
        };
        Ok(Some(value))
    }

    pub(crate) fn decode(buf: &mut Bytes, field: &'static str) -> Result<Self> {
        Self::decode_opt(buf, field)?
            .ok_or_else(|| ProtocolError::invalid_variant(field, TAG_NONE))
    }
}

impl From<u64> for Variant {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<NumericValue> for Variant {
    fn from(v: NumericValue) -> Self {
        match v {
            NumericValue::Uint64(v) => Self::Uint64(v),
            NumericValue::Double(v) => Self::Double(v),
        }
    }
}

/// History baselines are always numeric
///
/// Shares the `Variant` wire tags; a STR or NONE tag in a baseline is
/// rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Uint64(u64),
    Double(f64),
}

impl NumericValue {
    #[inline]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Uint64(_) => TAG_UI64,
            Self::Double(_) => TAG_DBL,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        put_u8(buf, self.tag());
        match self {
            Self::Uint64(v) => put_u64(buf, *v),
            Self::Double(v) => put_f64(buf, *v),
        }
    }

    pub(crate) fn decode(buf: &mut Bytes, field: &'static str) -> Result<Self> {
        match get_u8(buf, field)? {
            TAG_UI64 => Ok(Self::Uint64(get_u64(buf, field)?)),
            TAG_DBL => Ok(Self::Double(get_f64(buf, field)?)),
            tag => Err(ProtocolError::invalid_variant(field, tag)),
        }
    }
}
