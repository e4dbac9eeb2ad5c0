//! itempipe - Item value preprocessing endpoint and poller tools
//!
//! # Usage
//!
//! ```bash
//! # Run the manager endpoint
//! itempipe serve
//! itempipe --config configs/itempipe.toml serve
//!
//! # Ask a running manager for its queue depth
//! itempipe queue
//!
//! # Submit a single value
//! itempipe push --itemid 1001 --type uint64 57
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use itempipe_config::{Config, LogFormat, LogOutput};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// itempipe - Item value preprocessing endpoint and poller tools
#[derive(Parser, Debug)]
#[command(name = "itempipe")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the preprocessing manager endpoint
    Serve(cmd::serve::ServeArgs),

    /// Print the number of values queued at the manager
    Queue(cmd::queue::QueueArgs),

    /// Submit one value and flush it to the manager
    Push(cmd::push::PushArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(cli.config.as_deref())?;

    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, &config)?;

    match cli.command {
        Command::Serve(args) => cmd::serve::run(args, config).await,
        Command::Queue(args) => cmd::queue::run(args, config).await,
        Command::Push(args) => cmd::push::run(args, config).await,
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        // defaults to "info" when the file does not set it
        None => config.log.level.as_str().to_string(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let layer = match (config.log.format, config.log.output) {
        (LogFormat::Console, LogOutput::Stderr) => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Console, LogOutput::Stdout) => fmt::layer().with_target(true).boxed(),
        (LogFormat::Json, LogOutput::Stderr) => {
            fmt::layer().json().with_writer(std::io::stderr).boxed()
        }
        (LogFormat::Json, LogOutput::Stdout) => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    Ok(())
}
