//! Socket shared by pollers and the preprocessing manager

use std::path::PathBuf;

use serde::Deserialize;

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/itempipe-preprocessing.sock";

/// IPC configuration
///
/// # Example
///
/// ```toml
/// [ipc]
/// socket_path = "/run/itempipe/preprocessing.sock"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Unix socket of the preprocessing manager
    pub socket_path: PathBuf,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }
}
