//! IPC message envelope
//!
//! Every message between a poller, the preprocessing manager and its
//! workers travels in a frame:
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────┐
//! │ 4 bytes (LE) │ 4 bytes (LE) │ N bytes             │
//! │ message type │ length N     │ payload             │
//! └──────────────┴──────────────┴─────────────────────┘
//! ```
//!
//! # Message Types
//!
//! - `Request` (2): poller → manager, concatenated packed item values
//! - `Result` (3): worker → manager, packed result
//! - `Queue` (4): poller ↔ manager, empty request / 8-byte LE count reply
//! - `Task` (5): manager → worker, packed task

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::Result;
use crate::codec::WireFormat;
use crate::error::ProtocolError;

/// Size of the type + length header
pub const HEADER_SIZE: usize = 8;

/// Largest payload a frame may announce (256 MiB)
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

/// Size of the queue-size reply payload
pub const QUEUE_SIZE_REPLY_LEN: usize = 8;

/// IPC message type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    /// Batch of item values from a poller
    Request = 2,
    /// Preprocessing result from a worker
    Result = 3,
    /// Queue depth request and reply
    Queue = 4,
    /// Preprocessing task for a worker
    Task = 5,
}

impl MessageType {
    pub const fn from_u32(code: u32) -> Result<Self> {
        match code {
            2 => Ok(Self::Request),
            3 => Ok(Self::Result),
            4 => Ok(Self::Queue),
            5 => Ok(Self::Task),
            other => Err(ProtocolError::UnknownMessageType(other)),
        }
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Result => "result",
            Self::Queue => "queue",
            Self::Task => "task",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub message_type: MessageType,
    pub payload_len: usize,
}

impl FrameHeader {
    /// Parse the 8-byte header
    ///
    /// # Errors
    ///
    /// Unknown message type, or a length above `MAX_PAYLOAD_SIZE`.
    pub fn parse(header: &[u8; HEADER_SIZE]) -> Result<Self> {
        let code = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

        let message_type = MessageType::from_u32(code)?;
        if len > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            message_type,
            payload_len: len,
        })
    }
}

/// A complete IPC message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(message_type: MessageType, payload: Bytes) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Frame with a single packed message as payload
    pub fn packed<T: WireFormat>(message_type: MessageType, message: &T) -> Self {
        Self::new(message_type, message.to_bytes())
    }

    /// Queue depth request (empty payload)
    pub fn queue_request() -> Self {
        Self::new(MessageType::Queue, Bytes::new())
    }

    /// Queue depth reply
    pub fn queue_reply(size: u64) -> Self {
        Self::new(MessageType::Queue, Bytes::copy_from_slice(&size.to_le_bytes()))
    }

    /// Header plus payload, ready to write
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if the payload exceeds `MAX_PAYLOAD_SIZE`.
    pub fn encode(&self) -> Result<Bytes> {
        let len = self.payload.len();
        let wire_len = match u32::try_from(len) {
            Ok(n) if len <= MAX_PAYLOAD_SIZE => n,
            _ => {
                return Err(ProtocolError::PayloadTooLarge {
                    size: len,
                    max: MAX_PAYLOAD_SIZE,
                });
            }
        };

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + len);
        buf.put_u32_le(self.message_type.as_u32());
        buf.put_u32_le(wire_len);
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Parse one complete frame from the front of `buf`
    ///
    /// Returns `Ok(None)` if `buf` does not yet hold a whole frame; the
    /// buffer is left untouched in that case.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<Self>> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_SIZE];
        header.copy_from_slice(&buf[..HEADER_SIZE]);
        let header = FrameHeader::parse(&header)?;

        if buf.len() < HEADER_SIZE + header.payload_len {
            return Ok(None);
        }

        buf.advance(HEADER_SIZE);
        let payload = buf.split_to(header.payload_len).freeze();
        Ok(Some(Self::new(header.message_type, payload)))
    }
}

/// Read the queue depth from a reply payload (first 8 bytes, LE)
pub fn decode_queue_size(payload: &[u8]) -> Result<u64> {
    let Some(raw) = payload.first_chunk::<QUEUE_SIZE_REPLY_LEN>() else {
        return Err(ProtocolError::truncated(
            "queue size",
            QUEUE_SIZE_REPLY_LEN,
            payload.len(),
        ));
    };
    Ok(u64::from_le_bytes(*raw))
}
