//! Error types for the manager endpoint

use std::io;

use itempipe_protocol::{MessageType, ProtocolError};
use thiserror::Error;

/// Errors that can occur while serving pollers
#[derive(Error, Debug)]
pub enum ManagerError {
    /// I/O error (socket operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed frame or payload
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Message type the manager does not accept from pollers
    #[error("unexpected {0} message from poller")]
    UnexpectedMessage(MessageType),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for manager operations
pub type Result<T> = std::result::Result<T, ManagerError>;
