//! CLI for the SSE cluster node
//!
//! Subcommands:
//! - `start`: run a broker node until SIGINT/SIGTERM

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sse_cluster::broker::Broker;
use sse_cluster::cluster::{Membership, StaticMembership};
use sse_cluster::config::{LogFormat, load_config};
use sse_cluster::transport::{AppState, build_router, start_http_server};
use sse_cluster::utils::logging;

#[derive(Parser)]
#[command(name = "sse-cluster", version, about = "Commands for running an SSE broker node")]
enum Command {
    /// Start an SSE node
    Start {
        /// Configuration file to load, without extension
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    match Command::parse() {
        Command::Start { config } => start(config.as_deref()).await,
    }
}

async fn start(config_path: Option<&str>) -> Result<()> {
    let settings = load_config(config_path).context("failed to load configuration")?;
    logging::init(
        &settings.logging.level,
        settings.logging.format == LogFormat::Json,
    );

    let membership = StaticMembership::from_settings(&settings)
        .context("invalid cluster member address")?;
    info!(
        node = %membership.local_node().name,
        members = membership.num_members(),
        "created cluster membership"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(settings.http_client.timeout_ms))
        .build()
        .context("failed to build http client")?;

    let broker = Broker::new(Arc::new(membership), http);
    let shutdown = CancellationToken::new();

    let state = AppState {
        broker: broker.clone(),
        shutdown: shutdown.clone(),
    };
    let app = build_router(state, settings.server.cors_enabled);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let server = tokio::spawn(start_http_server_logged(addr, app, shutdown.clone()));

    tokio::select! {
        _ = wait_for_signal() => info!("got shutdown signal"),
        _ = shutdown.cancelled() => warn!("http server stopped unexpectedly"),
    }

    info!("shutting down http server");
    shutdown.cancel();
    server.await.context("http server task failed")?;

    info!("waiting for broker operations to finish");
    broker.close().await;

    Ok(())
}

async fn start_http_server_logged(addr: String, app: axum::Router, shutdown: CancellationToken) {
    if let Err(err) = start_http_server(&addr, app, shutdown.clone()).await {
        warn!(error = %err, "http server exited");
        // Nothing left to serve, let main wind down.
        shutdown.cancel();
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install ctrl-c handler");
    }
}
