//! `[log]` section
//!
//! Pollers and the manager share one logging setup. The binary turns this
//! section into a `tracing` filter and fmt layer; `--log-level` on the
//! command line replaces `level`.

use std::fmt;

use serde::Deserialize;

/// Most verbose events that get through the filter
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-frame and per-value detail
    Trace,
    /// Batch flushes, connects and disconnects
    Debug,
    #[default]
    Info,
    Warn,
    /// Only failures that stop a poller or the manager
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format of emitted events
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text for terminals
    #[default]
    Console,
    /// One JSON object per event, for log shippers
    Json,
}

/// Stream events are written to
///
/// Defaults to stderr so `itempipe queue` output on stdout stays parseable.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

/// Logging section of the config file
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "stdout"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
}
