//! Hand-off point for low-level discovery results
//!
//! A discovery rule's text result describes entities to create rather than a
//! value to store, so it bypasses the preprocessing queue entirely.

use itempipe_protocol::Timespec;
use tracing::info;

/// Receives the text of successful discovery-rule measurements
///
/// Fire-and-forget: failures are the handler's own business.
pub trait DiscoveryHandler: Send + Sync {
    fn process_discovery_rule(&self, itemid: u64, value: &str, ts: Timespec);
}

impl<F> DiscoveryHandler for F
where
    F: Fn(u64, &str, Timespec) + Send + Sync,
{
    fn process_discovery_rule(&self, itemid: u64, value: &str, ts: Timespec) {
        self(itemid, value, ts)
    }
}

/// Handler that only logs what it receives
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDiscovery;

impl DiscoveryHandler for LoggingDiscovery {
    fn process_discovery_rule(&self, itemid: u64, value: &str, ts: Timespec) {
        info!(itemid, bytes = value.len(), %ts, "discovery rule result received");
    }
}
