//! Configuration validation
//!
//! Rejects settings the endpoint cannot run with:
//! - Empty socket path
//! - Zero connection limit or queue capacity

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.ipc.socket_path.as_os_str().is_empty() {
        return Err(ConfigError::invalid_value("ipc", "socket_path", "must not be empty"));
    }

    if config.manager.max_connections == 0 {
        return Err(ConfigError::invalid_value(
            "manager",
            "max_connections",
            "must be at least 1",
        ));
    }

    if config.manager.queue_capacity == 0 {
        return Err(ConfigError::invalid_value(
            "manager",
            "queue_capacity",
            "must be at least 1",
        ));
    }

    Ok(())
}
