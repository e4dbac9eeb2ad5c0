//! Serve command - Run the preprocessing manager endpoint
//!
//! Accepts item value batches from pollers and keeps them in a bounded
//! in-memory queue. Queue depth requests are answered from that queue.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use itempipe_config::Config;
use itempipe_manager::{ManagerServer, ManagerServerConfig, RequestHandler, ValueQueue};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path (overrides [ipc] socket_path)
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs, config: Config) -> Result<()> {
    let socket_path = super::socket_path(&config, args.socket);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        socket = %socket_path.display(),
        max_connections = config.manager.max_connections,
        queue_capacity = config.manager.queue_capacity,
        "itempipe manager starting"
    );

    let queue = Arc::new(ValueQueue::new(config.manager.queue_capacity));
    let server_config = ManagerServerConfig::default()
        .with_socket_path(&socket_path)
        .with_max_connections(config.manager.max_connections);
    let server = ManagerServer::new(Arc::clone(&queue) as Arc<dyn RequestHandler>, server_config);

    let listener = server
        .bind()
        .with_context(|| format!("failed to bind {}", socket_path.display()))?;

    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let server_task = tokio::spawn(async move { server.serve(listener, server_cancel).await });

    wait_for_shutdown().await?;
    info!("shutdown signal received, stopping manager...");
    cancel.cancel();

    match server_task.await {
        Ok(result) => result.context("manager server failed")?,
        Err(e) => warn!(error = %e, "manager task panicked during shutdown"),
    }

    info!(
        received = queue.received(),
        dropped = queue.dropped(),
        queued = queue.len(),
        "itempipe manager shutdown complete"
    );
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() -> Result<()> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install signal handler")?;

    tokio::select! {
        ctrl_c = signal::ctrl_c() => ctrl_c.context("failed to install Ctrl+C handler")?,
        _ = terminate.recv() => {},
    }
    Ok(())
}
