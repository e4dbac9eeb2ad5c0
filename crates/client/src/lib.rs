//! Itempipe Client Library
//!
//! Poller-side entry point into the preprocessing pipeline. Pollers hand
//! every measured value to a [`PreprocessingClient`], which batches the
//! packed values locally and ships them to the preprocessing manager over a
//! Unix socket.
//!
//! # Architecture
//!
//! - [`cache`] - Append-only buffer of packed item values
//! - [`transport`] - Framed Unix socket connection to the manager
//! - [`discovery`] - Hand-off for discovery-rule results
//! - [`client`] - Orchestration: routing, batching, flushing, queue queries
//! - [`test_utils`] - In-memory transport for tests
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use itempipe_client::{LoggingDiscovery, PreprocessingClient};
//! use itempipe_protocol::{AgentResult, Measurement, ValueType};
//!
//! # async fn example() -> itempipe_client::Result<()> {
//! let mut client = PreprocessingClient::connect_lazy(
//!     "/tmp/itempipe-preprocessing.sock",
//!     Arc::new(LoggingDiscovery),
//! );
//!
//! client
//!     .preprocess_item_value(Measurement::value(
//!         1001,
//!         ValueType::Uint64,
//!         AgentResult::uint64(57),
//!         None,
//!     ))
//!     .await?;
//!
//! // End of the polling cycle
//! client.flush().await?;
//!
//! let queued = client.queue_size().await?;
//! # let _ = queued;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod cache;
pub mod client;
pub mod discovery;
pub mod test_utils;
pub mod transport;

// Re-export main types at crate root for convenience
pub use cache::{BATCH_THRESHOLD, BatchCache, PendingBatch};
pub use client::{ClientStats, FATAL_EXIT_CODE, FailurePolicy, PreprocessingClient};
pub use discovery::{DiscoveryHandler, LoggingDiscovery};
pub use error::{ClientError, Result, TransportError};
pub use transport::{DEFAULT_SOCKET_PATH, IpcTransport, Transport};
