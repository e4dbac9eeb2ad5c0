//! Itempipe Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use itempipe_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[manager]\nqueue_capacity = 5000").unwrap();
//! assert_eq!(config.manager.queue_capacity, 5000);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//!
//! [ipc]
//! socket_path = "/tmp/itempipe-preprocessing.sock"
//!
//! [manager]
//! max_connections = 100
//! queue_capacity = 100000
//! ```

mod error;
mod ipc;
mod logging;
mod manager;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use ipc::{DEFAULT_SOCKET_PATH, IpcConfig};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use manager::ManagerConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Socket shared by pollers and the manager
    pub ipc: IpcConfig,

    /// Manager endpoint settings
    pub manager: ManagerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
