//! Itempipe Manager - receiving end of the preprocessing socket (Unix only)
//!
//! Pollers batch packed item values and send them here. This crate provides
//! the socket endpoint that accepts those batches and answers queue depth
//! requests:
//!
//! - [`ManagerServer`] reads frames from every poller connection
//! - [`RequestHandler`] decides what happens to received values
//! - [`ValueQueue`] is a bounded FIFO handler that evicts the oldest value
//!   when full
//!
//! Running preprocessing steps on queued values is outside this crate.
//!
//! # Architecture
//!
//! ```text
//! Poller ──Request──→ ManagerServer ──on_values──→ RequestHandler
//!        ←──Queue───┘               ──queue_size─┘
//! ```

#[cfg(unix)]
mod error;
#[cfg(unix)]
pub mod queue;
#[cfg(unix)]
pub mod server;

#[cfg(unix)]
pub use error::{ManagerError, Result};
#[cfg(unix)]
pub use queue::{DEFAULT_QUEUE_CAPACITY, ValueQueue};
#[cfg(unix)]
pub use server::{DEFAULT_SOCKET_PATH, ManagerServer, ManagerServerConfig, RequestHandler};

// Re-export the cancellation token used for shutdown
#[cfg(unix)]
pub use tokio_util::sync::CancellationToken;
