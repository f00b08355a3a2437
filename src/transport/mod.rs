//! The `transport` module exposes the broker over HTTP.
//!
//! Subscribers hold a `text/event-stream` response open, publishers and
//! other nodes POST JSON messages, and `/status` reports the node's view of
//! itself and the cluster.

pub mod http;
pub mod sse;

pub use http::{AppState, build_router};

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serves `app` on `addr` until `shutdown` is cancelled, then waits for
/// in-flight requests to finish.
pub async fn start_http_server(
    addr: &str,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app, shutdown).await
}

/// Like [`start_http_server`], on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "starting http server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod tests;
