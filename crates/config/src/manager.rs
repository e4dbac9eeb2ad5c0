//! Preprocessing manager endpoint settings

use serde::Deserialize;

/// Manager configuration
///
/// # Example
///
/// ```toml
/// [manager]
/// max_connections = 100
/// queue_capacity = 100000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Maximum concurrent poller connections
    /// Default: 100
    pub max_connections: usize,

    /// Values held before the oldest are dropped
    /// Default: 100000
    pub queue_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            queue_capacity: 100_000,
        }
    }
}
