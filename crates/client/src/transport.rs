//! Connection to the preprocessing manager
//!
//! A [`Transport`] carries opaque payloads tagged with a message type. The
//! production implementation, [`IpcTransport`], keeps one Unix socket per
//! process and opens it lazily on first use.
//!
//! # Protocol
//!
//! Every message is a frame: `[4-byte LE type][4-byte LE length][payload]`.
//! `send` writes one frame and returns; `send_and_wait` then reads frames
//! until the reply with the same message type arrives.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, info, warn};

use itempipe_protocol::{Frame, MessageType};

use crate::error::TransportError;

/// Default socket path of the preprocessing manager
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/itempipe-preprocessing.sock";

/// Read buffer size for replies
const READ_BUFFER_SIZE: usize = 4 * 1024;

/// Message channel to the preprocessing manager
#[async_trait]
pub trait Transport: Send {
    /// Send one message without waiting for a reply
    async fn send(&mut self, message_type: MessageType, payload: Bytes)
    -> Result<(), TransportError>;

    /// Send one message and block until the reply payload arrives
    async fn send_and_wait(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<Bytes, TransportError>;
}

/// Unix socket transport, connected on first use
pub struct IpcTransport {
    socket_path: PathBuf,
    stream: Option<UnixStream>,
    read_buf: BytesMut,
}

impl IpcTransport {
    /// Create a transport for `path` without connecting yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            socket_path: path.as_ref().to_path_buf(),
            stream: None,
            read_buf: BytesMut::with_capacity(READ_BUFFER_SIZE),
        }
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the connection has been opened
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn connection(&mut self) -> Result<&mut UnixStream, TransportError> {
        if self.stream.is_none() {
            let stream = UnixStream::connect(&self.socket_path)
                .await
                .map_err(|source| TransportError::Connect {
                    path: self.socket_path.clone(),
                    source,
                })?;
            info!(path = %self.socket_path.display(), "connected to preprocessing manager");
            self.stream = Some(stream);
        }

        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(TransportError::Closed),
        }
    }

    async fn write_frame(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<(), TransportError> {
        let encoded = Frame::new(message_type, payload).encode()?;
        let stream = self.connection().await?;

        let written = stream.write_all(&encoded).await;
        if let Err(source) = written {
            self.disconnect();
            return Err(TransportError::Write {
                message_type,
                source,
            });
        }
        Ok(())
    }

    /// Drop the connection and anything read from it
    ///
    /// The next send reconnects and starts from a clean frame boundary.
    fn disconnect(&mut self) {
        self.stream = None;
        self.read_buf.clear();
    }

    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        let frame = self.next_frame().await;
        if let Err(e) = &frame {
            warn!(error = %e, "dropping connection to preprocessing manager");
            self.disconnect();
        }
        frame
    }

    async fn next_frame(&mut self) -> Result<Frame, TransportError> {
        loop {
            if let Some(frame) = Frame::parse(&mut self.read_buf)? {
                return Ok(frame);
            }

            let Some(stream) = self.stream.as_mut() else {
                return Err(TransportError::Closed);
            };
            let n = stream
                .read_buf(&mut self.read_buf)
                .await
                .map_err(TransportError::Read)?;

            if n == 0 {
                return Err(TransportError::Closed);
            }
        }
    }
}

#[async_trait]
impl Transport for IpcTransport {
    async fn send(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<(), TransportError> {
        let len = payload.len();
        self.write_frame(message_type, payload).await?;
        debug!(%message_type, bytes = len, "sent message");
        Ok(())
    }

    async fn send_and_wait(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<Bytes, TransportError> {
        self.write_frame(message_type, payload).await?;

        let reply = self.read_frame().await?;
        if reply.message_type != message_type {
            return Err(TransportError::UnexpectedReply {
                expected: message_type,
                actual: reply.message_type,
            });
        }

        debug!(%message_type, bytes = reply.payload.len(), "received reply");
        Ok(reply.payload)
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
