//! Enumerations and small value types shared by every message
//!
//! Numeric codes are part of the wire format and must not change.

use std::fmt;

use crate::Result;
use crate::error::ProtocolError;

/// How an item's measured value is interpreted and stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// Floating point number
    Float = 0,
    /// Short character string
    Str = 1,
    /// Log record with source, severity and event id
    Log = 2,
    /// Unsigned 64-bit integer
    Uint64 = 3,
    /// Long text
    Text = 4,
}

impl ValueType {
    /// Parse value type from raw byte value
    #[inline]
    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Float),
            1 => Ok(Self::Str),
            2 => Ok(Self::Log),
            3 => Ok(Self::Uint64),
            4 => Ok(Self::Text),
            other => Err(ProtocolError::InvalidValueType(other)),
        }
    }

    /// Convert to raw byte value
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Numeric items are the only ones with a history baseline
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Uint64)
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Str => "str",
            Self::Log => "log",
            Self::Uint64 => "uint64",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the measurement succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ItemState {
    #[default]
    Normal = 0,
    NotSupported = 1,
}

impl ItemState {
    #[inline]
    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::NotSupported),
            other => Err(ProtocolError::InvalidState(other)),
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Item flag bitmask
///
/// Only the discovery-rule bit is consulted by the submission path; the
/// other bits travel with the value unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemFlags(u8);

impl ItemFlags {
    /// Plain item
    pub const NORMAL: Self = Self(0x00);
    /// Low-level discovery rule; its text result describes entities to create
    pub const DISCOVERY_RULE: Self = Self(0x01);
    /// Item prototype
    pub const PROTOTYPE: Self = Self(0x02);
    /// Item created by discovery
    pub const CREATED: Self = Self(0x04);

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_discovery_rule(self) -> bool {
        self.contains(Self::DISCOVERY_RULE)
    }
}

impl std::ops::BitOr for ItemFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Timespec {
    pub sec: i32,
    pub ns: i32,
}

impl Timespec {
    #[inline]
    pub const fn new(sec: i32, ns: i32) -> Self {
        Self { sec, ns }
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self::from_unix(now.timestamp(), now.timestamp_subsec_nanos())
    }

    /// Convert a 64-bit Unix time, clamping seconds to the `i32` range
    pub fn from_unix(secs: i64, nanos: u32) -> Self {
        let sec = i32::try_from(secs).unwrap_or(if secs < 0 { i32::MIN } else { i32::MAX });
        // leap seconds report up to 1_999_999_999
        let ns = i32::try_from(nanos).unwrap_or(i32::MAX);
        Self { sec, ns }
    }
}

impl fmt::Display for Timespec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.ns)
    }
}

/// Preprocessing step kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StepType {
    /// Multiply by a custom factor
    Multiplier = 1,
    /// Strip characters from the right
    Rtrim = 2,
    /// Strip characters from the left
    Ltrim = 3,
    /// Strip characters from both ends
    Trim = 4,
    /// Regular expression substitution
    Regsub = 5,
    /// Boolean word to decimal
    Bool2Dec = 6,
    /// Octal to decimal
    Oct2Dec = 7,
    /// Hexadecimal to decimal
    Hex2Dec = 8,
    /// Difference from the previous value
    DeltaValue = 9,
    /// Difference from the previous value per second
    DeltaSpeed = 10,
    /// XPath extraction
    Xpath = 11,
    /// JSONPath extraction
    Jsonpath = 12,
}

impl StepType {
    #[inline]
    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Multiplier),
            2 => Ok(Self::Rtrim),
            3 => Ok(Self::Ltrim),
            4 => Ok(Self::Trim),
            5 => Ok(Self::Regsub),
            6 => Ok(Self::Bool2Dec),
            7 => Ok(Self::Oct2Dec),
            8 => Ok(Self::Hex2Dec),
            9 => Ok(Self::DeltaValue),
            10 => Ok(Self::DeltaSpeed),
            11 => Ok(Self::Xpath),
            12 => Ok(Self::Jsonpath),
            other => Err(ProtocolError::InvalidStepType(other)),
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Steps that need the previous value of the item as a baseline
    #[inline]
    pub const fn is_stateful(self) -> bool {
        matches!(self, Self::DeltaValue | Self::DeltaSpeed)
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multiplier => "multiplier",
            Self::Rtrim => "rtrim",
            Self::Ltrim => "ltrim",
            Self::Trim => "trim",
            Self::Regsub => "regsub",
            Self::Bool2Dec => "bool2dec",
            Self::Oct2Dec => "oct2dec",
            Self::Hex2Dec => "hex2dec",
            Self::DeltaValue => "delta_value",
            Self::DeltaSpeed => "delta_speed",
            Self::Xpath => "xpath",
            Self::Jsonpath => "jsonpath",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
