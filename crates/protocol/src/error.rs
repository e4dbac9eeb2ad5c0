//! Protocol error types
//!
//! Errors that can occur when decoding wire messages or building values
//! that violate the item value invariants.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Buffer ended before a field could be read
    #[error("truncated {field}: expected {expected} bytes, got {actual}")]
    Truncated {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Length-prefixed string without NUL terminator or not UTF-8
    #[error("invalid string in {field}: {reason}")]
    InvalidString {
        field: &'static str,
        reason: &'static str,
    },

    /// Optional-section marker other than 0 or 1
    #[error("invalid {field} marker: {value}")]
    InvalidMarker { field: &'static str, value: u8 },

    /// Unknown item value type code
    #[error("invalid value type: {0}")]
    InvalidValueType(u8),

    /// Unknown item state code
    #[error("invalid item state: {0}")]
    InvalidState(u8),

    /// Unknown variant tag, or a tag not allowed in this position
    #[error("invalid variant tag for {field}: {tag}")]
    InvalidVariant { field: &'static str, tag: u8 },

    /// Unknown preprocessing step code
    #[error("invalid preprocessing step type: {0}")]
    InvalidStepType(u8),

    /// Negative or oversized step count
    #[error("invalid step count: {0}")]
    InvalidStepCount(i32),

    /// Agent result type flags carrying more than one value
    #[error("ambiguous agent result flags: {0:#x}")]
    AmbiguousResult(i32),

    /// Unknown IPC message type code
    #[error("unknown message type: {0}")]
    UnknownMessageType(u32),

    /// Frame payload exceeds maximum size
    #[error("payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Item value whose state, result and error contradict each other
    #[error("invalid item value {itemid}: {reason}")]
    InvalidItemValue { itemid: u64, reason: &'static str },
}

impl ProtocolError {
    /// Create a truncated field error
    #[inline]
    pub fn truncated(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::Truncated {
            field,
            expected,
            actual,
        }
    }

    /// Create an invalid string error
    #[inline]
    pub fn invalid_string(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidString { field, reason }
    }

    /// Create an invalid variant error
    #[inline]
    pub fn invalid_variant(field: &'static str, tag: u8) -> Self {
        Self::InvalidVariant { field, tag }
    }

    /// Create an invalid item value error
    #[inline]
    pub fn invalid_item_value(itemid: u64, reason: &'static str) -> Self {
        Self::InvalidItemValue { itemid, reason }
    }
}
