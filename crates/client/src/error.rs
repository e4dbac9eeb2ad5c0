//! Error types for the preprocessing client

use std::io;
use std::path::PathBuf;

use itempipe_protocol::{MessageType, ProtocolError};
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures talking to the preprocessing manager
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not open the socket
    #[error("failed to connect to preprocessing manager at '{path}': {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Write to the socket failed
    #[error("failed to send {message_type} message: {source}")]
    Write {
        message_type: MessageType,
        #[source]
        source: io::Error,
    },

    /// Read from the socket failed
    #[error("failed to read reply: {0}")]
    Read(#[source] io::Error),

    /// Manager closed the connection before replying
    #[error("connection closed by preprocessing manager")]
    Closed,

    /// Reply could not be parsed
    #[error("malformed reply: {0}")]
    Protocol(#[from] ProtocolError),

    /// Reply carried a different message type than the request
    #[error("unexpected reply: expected {expected}, got {actual}")]
    UnexpectedReply {
        expected: MessageType,
        actual: MessageType,
    },
}

/// Errors returned by [`PreprocessingClient`](crate::PreprocessingClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport to the manager failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Measurement fields contradict each other
    #[error("rejected measurement: {0}")]
    InvalidValue(#[source] ProtocolError),

    /// Manager answered with bytes that do not decode
    #[error("protocol mismatch with preprocessing manager: {0}")]
    Protocol(#[source] ProtocolError),
}

impl ClientError {
    /// Whether the fail-fast policy applies to this error
    ///
    /// Rejected measurements are caller mistakes and never stop the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidValue(_))
    }
}
