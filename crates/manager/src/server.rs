//! Unix socket server for poller connections
//!
//! `ManagerServer` listens on a Unix socket and reads frames from every
//! connected poller. Item value batches go to a [`RequestHandler`]; queue
//! requests are answered with the handler's current depth.
//!
//! # Protocol
//!
//! All messages are framed: `[4-byte LE type][4-byte LE length][payload]`
//!
//! Poller → Manager:
//! - `Request` - Concatenated packed item values, no reply
//! - `Queue` - Empty payload, answered with a `Queue` frame
//!
//! Manager → Poller:
//! - `Queue` - 8-byte little-endian queue depth
//!
//! Any other message type closes the connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use itempipe_protocol::{Frame, ItemValue, MessageType, decode_item_values};

use crate::error::{ManagerError, Result};

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/itempipe-preprocessing.sock";

/// Receives what pollers send
pub trait RequestHandler: Send + Sync {
    /// One decoded `Request` batch, in submission order
    fn on_values(&self, values: Vec<ItemValue>);

    /// Values queued but not yet preprocessed
    fn queue_size(&self) -> u64;
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ManagerServerConfig {
    /// Path to the Unix socket
    pub socket_path: PathBuf,
    /// Maximum concurrent connections
    pub max_connections: usize,
    /// Read buffer size
    pub read_buffer_size: usize,
}

impl Default for ManagerServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            max_connections: 100,
            read_buffer_size: 64 * 1024,
        }
    }
}

impl ManagerServerConfig {
    /// Create config with custom socket path
    pub fn with_socket_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.socket_path = path.as_ref().to_path_buf();
        self
    }

    /// Create config with a connection limit
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }
}

/// Unix socket server for poller connections
pub struct ManagerServer {
    config: ManagerServerConfig,
    handler: Arc<dyn RequestHandler>,
}

impl ManagerServer {
    /// Create a new manager server
    pub fn new(handler: Arc<dyn RequestHandler>, config: ManagerServerConfig) -> Self {
        Self { config, handler }
    }

    /// Create with default configuration
    pub fn with_defaults(handler: Arc<dyn RequestHandler>) -> Self {
        Self::new(handler, ManagerServerConfig::default())
    }

    /// Get the socket path
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Bind the socket, replacing a stale socket file
    pub fn bind(&self) -> Result<UnixListener> {
        if self.config.max_connections == 0 {
            return Err(ManagerError::InvalidConfig(
                "max_connections must be at least 1".into(),
            ));
        }

        if self.config.socket_path.exists() {
            std::fs::remove_file(&self.config.socket_path)?;
        }

        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!(path = %self.config.socket_path.display(), "preprocessing manager listening");
        Ok(listener)
    }

    /// Bind and serve until `shutdown` is cancelled
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener, shutdown).await
    }

    /// Accept connections on an already bound listener until `shutdown` is
    /// cancelled
    ///
    /// At `max_connections` the accept loop waits for a poller to disconnect;
    /// new pollers queue in the listen backlog and are served in turn, so
    /// nothing they write is lost. The socket file is removed on the way out.
    pub async fn serve(&self, listener: UnixListener, shutdown: CancellationToken) -> Result<()> {
        let permits = Arc::new(Semaphore::new(self.config.max_connections));

        loop {
            if permits.available_permits() == 0 {
                warn!(
                    max_connections = self.config.max_connections,
                    "connection limit reached, waiting for a poller to disconnect"
                );
            }

            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    // never closed while serving
                    Err(_) => break,
                },
            };

            let stream = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, _addr)) => stream,
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        continue;
                    }
                },
            };

            let handler = Arc::clone(&self.handler);
            let read_buffer_size = self.config.read_buffer_size;
            let shutdown = shutdown.child_token();

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, handler, read_buffer_size, shutdown).await
                {
                    warn!(error = %e, "poller connection closed");
                }
                drop(permit);
            });
        }

        if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
            debug!(error = %e, "could not remove socket file");
        }
        info!("preprocessing manager stopped");
        Ok(())
    }

    /// Start the server in a background task
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

/// Serve one poller until it hangs up
async fn handle_connection(
    mut stream: UnixStream,
    handler: Arc<dyn RequestHandler>,
    read_buffer_size: usize,
    shutdown: CancellationToken,
) -> Result<()> {
    debug!("poller connected");
    let mut buf = BytesMut::with_capacity(read_buffer_size);

    loop {
        while let Some(frame) = Frame::parse(&mut buf)? {
            dispatch(&mut stream, handler.as_ref(), frame).await?;
        }

        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),

            read = stream.read_buf(&mut buf) => {
                if read? == 0 {
                    if !buf.is_empty() {
                        warn!(bytes = buf.len(), "poller hung up mid-frame");
                    }
                    debug!("poller disconnected");
                    return Ok(());
                }
            }
        }
    }
}

async fn dispatch(stream: &mut UnixStream, handler: &dyn RequestHandler, frame: Frame) -> Result<()> {
    match frame.message_type {
        MessageType::Request => {
            let bytes = frame.payload.len();
            let values = decode_item_values(frame.payload)?;
            trace!(values = values.len(), bytes, "received item values");
            handler.on_values(values);
        }
        MessageType::Queue => {
            let size = handler.queue_size();
            let reply = Frame::queue_reply(size).encode()?;
            stream.write_all(&reply).await?;
            trace!(size, "answered queue request");
        }
        other => return Err(ManagerError::UnexpectedMessage(other)),
    }
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
