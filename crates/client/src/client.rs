//! Preprocessing client owned by one poller process
//!
//! [`PreprocessingClient`] is the single funnel through which measured
//! values enter the preprocessing pipeline. It owns the batch cache and the
//! transport, so every operation takes `&mut self` and no locking is needed.
//!
//! # Failure Policy
//!
//! A poller that cannot reach the manager cannot make progress. With
//! [`FailurePolicy::Exit`] (the default) transport and protocol failures are
//! logged and the process exits so that its supervisor restarts it.
//! [`FailurePolicy::Propagate`] returns them instead. Either way a batch
//! that failed to send is gone; there is no retry.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, trace};

use itempipe_protocol::{ItemValue, Measurement, MessageType, Timespec, decode_queue_size};

use crate::cache::BatchCache;
use crate::discovery::DiscoveryHandler;
use crate::error::{ClientError, Result};
use crate::transport::{IpcTransport, Transport};

/// Exit status used when the manager is unreachable
pub const FATAL_EXIT_CODE: i32 = 1;

/// What to do when the manager cannot be reached or answers garbage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log and terminate the process
    #[default]
    Exit,
    /// Return the error to the caller
    Propagate,
}

/// Counters since the client was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Values accepted into the batch cache
    pub values_enqueued: u64,
    /// Request messages sent to the manager
    pub batches_flushed: u64,
    /// Discovery results handed to the discovery handler
    pub discovery_forwarded: u64,
}

/// Batching client for the preprocessing manager
pub struct PreprocessingClient<T: Transport = IpcTransport> {
    transport: T,
    cache: BatchCache,
    discovery: Arc<dyn DiscoveryHandler>,
    policy: FailurePolicy,
    stats: ClientStats,
}

impl PreprocessingClient<IpcTransport> {
    /// Client talking to the manager socket at `socket_path`
    ///
    /// The connection is opened on the first send.
    pub fn connect_lazy(
        socket_path: impl AsRef<std::path::Path>,
        discovery: Arc<dyn DiscoveryHandler>,
    ) -> Self {
        Self::new(IpcTransport::new(socket_path), discovery)
    }
}

impl<T: Transport> PreprocessingClient<T> {
    pub fn new(transport: T, discovery: Arc<dyn DiscoveryHandler>) -> Self {
        Self {
            transport,
            cache: BatchCache::new(),
            discovery,
            policy: FailurePolicy::default(),
            stats: ClientStats::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Number of values waiting for the next flush
    pub fn pending(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit one measured value
    ///
    /// Successful discovery-rule results with a textual value go to the
    /// discovery handler and never reach the cache. Everything else is
    /// validated and enqueued.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if state, result and error contradict each other;
    /// otherwise whatever an automatic flush escalates.
    pub async fn preprocess_item_value(&mut self, measurement: Measurement) -> Result<()> {
        if let Some(text) = measurement.discovery_text() {
            let ts = measurement.ts.unwrap_or_else(Timespec::now);
            self.discovery
                .process_discovery_rule(measurement.itemid, text, ts);
            self.stats.discovery_forwarded += 1;
            trace!(itemid = measurement.itemid, "handed value to discovery");
            return Ok(());
        }

        let value = ItemValue::try_from(measurement).map_err(ClientError::InvalidValue)?;
        self.enqueue(&value).await
    }

    /// Pack `value` into the cache, flushing once the batch threshold is
    /// exceeded
    pub async fn enqueue(&mut self, value: &ItemValue) -> Result<()> {
        self.stats.values_enqueued += 1;
        if self.cache.push(value) {
            debug!(pending = self.cache.len(), "batch threshold exceeded");
            self.flush().await?;
        }
        Ok(())
    }

    /// Send everything pending as one request; no-op when nothing is pending
    pub async fn flush(&mut self) -> Result<()> {
        let Some(batch) = self.cache.take() else {
            return Ok(());
        };

        let bytes = batch.payload.len();
        let sent = self.transport.send(MessageType::Request, batch.payload).await;
        if let Err(e) = sent {
            return Err(self.escalate(e.into()));
        }

        self.stats.batches_flushed += 1;
        debug!(values = batch.count, bytes, "flushed values to preprocessing manager");
        Ok(())
    }

    /// Ask the manager how many values are queued but not yet preprocessed
    pub async fn queue_size(&mut self) -> Result<u64> {
        let reply = self
            .transport
            .send_and_wait(MessageType::Queue, Bytes::new())
            .await;

        let payload = match reply {
            Ok(payload) => payload,
            Err(e) => return Err(self.escalate(e.into())),
        };

        match decode_queue_size(&payload) {
            Ok(size) => Ok(size),
            Err(e) => Err(self.escalate(ClientError::Protocol(e))),
        }
    }

    fn escalate(&self, err: ClientError) -> ClientError {
        if self.policy == FailurePolicy::Exit && err.is_fatal() {
            error!(error = %err, "cannot reach preprocessing manager, exiting");
            std::process::exit(FATAL_EXIT_CODE);
        }
        err
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
