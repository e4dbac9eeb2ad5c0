//! Queue command - Print the preprocessing queue depth
//!
//! # Usage
//!
//! ```bash
//! itempipe queue
//! itempipe queue --socket /run/itempipe/pp.sock
//! itempipe queue --watch 5
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use itempipe_client::{FailurePolicy, LoggingDiscovery, PreprocessingClient};
use itempipe_config::Config;

/// Queue command arguments
#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Socket path (overrides [ipc] socket_path)
    #[arg(short, long)]
    pub socket: Option<PathBuf>,

    /// Repeat every N seconds until interrupted
    #[arg(short, long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Run the queue command
pub async fn run(args: QueueArgs, config: Config) -> Result<()> {
    let socket_path = super::socket_path(&config, args.socket);
    let mut client = PreprocessingClient::connect_lazy(&socket_path, Arc::new(LoggingDiscovery))
        .with_policy(FailurePolicy::Propagate);

    let Some(secs) = args.watch else {
        let size = client
            .queue_size()
            .await
            .with_context(|| format!("failed to query {}", socket_path.display()))?;
        println!("{size}");
        return Ok(());
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = ticker.tick() => {
                let size = client.queue_size().await.context("queue query failed")?;
                println!("{size}");
            }
        }
    }
}
