//! Local batch cache
//!
//! Packed item values accumulate back to back in one growable buffer so a
//! whole polling cycle reaches the manager in a single write. The buffer is
//! handed out by [`BatchCache::take`] and the cache starts over empty; the
//! allocation is reused across batches.

use bytes::{Bytes, BytesMut};
use itempipe_protocol::{ItemValue, WireFormat};

/// Pending values above which the client flushes on its own
pub const BATCH_THRESHOLD: usize = 256;

/// Initial buffer capacity in bytes (16KB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 16 * 1024;

/// Accumulated values, ready to send as one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBatch {
    /// Concatenated packed item values, in submission order
    pub payload: Bytes,
    /// Number of values in `payload`
    pub count: usize,
}

/// Append-only buffer of packed item values
#[derive(Debug)]
pub struct BatchCache {
    buf: BytesMut,
    count: usize,
}

impl Default for BatchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCache {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(DEFAULT_BUFFER_CAPACITY),
            count: 0,
        }
    }

    /// Pack `value` onto the end of the buffer
    ///
    /// Returns `true` once the number of pending values exceeds
    /// [`BATCH_THRESHOLD`].
    pub fn push(&mut self, value: &ItemValue) -> bool {
        value.encode(&mut self.buf);
        self.count += 1;
        self.count > BATCH_THRESHOLD
    }

    /// Hand out everything accumulated so far and reset
    ///
    /// Returns `None` when nothing is pending.
    pub fn take(&mut self) -> Option<PendingBatch> {
        if self.count == 0 {
            return None;
        }

        let count = std::mem::take(&mut self.count);
        Some(PendingBatch {
            payload: self.buf.split().freeze(),
            count,
        })
    }

    /// Number of pending values
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of pending bytes
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
