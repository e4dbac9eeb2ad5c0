//! itempipe protocol - wire format of the preprocessing pipeline
//!
//! This crate provides the types that travel between pollers, the
//! preprocessing manager and its workers:
//! - `ItemValue` - One raw measurement submitted by a poller
//! - `TaskMessage` - One value plus the preprocessing chain to apply
//! - `ResultMessage` - The transformed value, updated baseline or error
//! - `Frame` - Type + length envelope around every IPC message
//!
//! # Design Principles
//!
//! - **Flat, little-endian**: fixed-width scalars, length-prefixed strings,
//!   one-byte markers for optional sections
//! - **Cursor based**: encoders append to `BytesMut`, decoders advance `Bytes`
//! - **Checked**: decoding never reads past the buffer and never panics;
//!   malformed input is a `ProtocolError`

mod codec;
mod error;
mod frame;
mod item_value;
mod schema;
mod task;
mod variant;

pub use codec::{
    MARKER_ABSENT, MARKER_PRESENT, WireFormat, decode_all, get_f64, get_i32, get_marker, get_str,
    get_u8, get_u64, put_f64, put_i32, put_marker, put_str, put_u8, put_u64,
};
pub use error::ProtocolError;
pub use frame::{
    Frame, FrameHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE, MessageType, QUEUE_SIZE_REPLY_LEN,
    decode_queue_size,
};
pub use item_value::{
    AgentResult, ItemValue, LogMeta, LogRecord, Measurement, Outcome, ResultValue, result_flags,
};
pub use schema::{ItemFlags, ItemState, StepType, Timespec, ValueType};
pub use task::{HistoryValue, PreprocessingStep, ResultMessage, TaskHistory, TaskMessage};
pub use variant::{NumericValue, Variant};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Decode every item value of a `Request` payload, in submission order
pub fn decode_item_values(payload: Bytes) -> Result<Vec<ItemValue>> {
    decode_all(payload)
}

// Test modules - only compiled during testing
#[cfg(test)]
mod codec_test;
#[cfg(test)]
mod schema_test;
