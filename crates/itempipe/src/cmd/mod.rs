//! Command implementations for the itempipe CLI

pub mod push;
pub mod queue;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use itempipe_config::Config;

/// Load the config file, or defaults when no path is given
///
/// A path that was given explicitly must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Config::from_file(path).context("failed to load configuration")
        }
        None => Ok(Config::default()),
    }
}

/// Socket to use: command-line override, else the configured one
pub fn socket_path(config: &Config, override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| config.ipc.socket_path.clone())
}
