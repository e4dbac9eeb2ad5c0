//! Bounded in-memory queue of received item values
//!
//! Stands in for the preprocessing queue: values wait here until a worker
//! takes them. When full, the oldest value is evicted so the freshest
//! measurements survive, and the eviction is counted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use itempipe_protocol::ItemValue;
use parking_lot::Mutex;
use tracing::warn;

use crate::server::RequestHandler;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;

/// FIFO of item values with a fixed capacity
#[derive(Debug)]
pub struct ValueQueue {
    values: Mutex<VecDeque<ItemValue>>,
    capacity: usize,
    received: AtomicU64,
    dropped: AtomicU64,
}

impl ValueQueue {
    /// Create a queue holding at most `capacity` values
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            received: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append `values` in order, evicting the oldest entries on overflow
    ///
    /// Returns the number of values evicted.
    pub fn push_batch(&self, values: Vec<ItemValue>) -> usize {
        let count = values.len() as u64;
        let mut evicted = 0;
        {
            let mut queue = self.values.lock();
            for value in values {
                if queue.len() == self.capacity {
                    queue.pop_front();
                    evicted += 1;
                }
                queue.push_back(value);
            }
        }

        self.received.fetch_add(count, Ordering::Relaxed);
        if evicted > 0 {
            self.dropped.fetch_add(evicted as u64, Ordering::Relaxed);
            warn!(evicted, capacity = self.capacity, "value queue full, dropped oldest");
        }
        evicted
    }

    /// Take the oldest value
    pub fn pop(&self) -> Option<ItemValue> {
        self.values.lock().pop_front()
    }

    /// Take up to `max` of the oldest values
    pub fn drain(&self, max: usize) -> Vec<ItemValue> {
        let mut queue = self.values.lock();
        let n = max.min(queue.len());
        queue.drain(..n).collect()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values received since creation, evicted ones included
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Values evicted because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for ValueQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl RequestHandler for ValueQueue {
    fn on_values(&self, values: Vec<ItemValue>) {
        self.push_batch(values);
    }

    fn queue_size(&self) -> u64 {
        self.len() as u64
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
