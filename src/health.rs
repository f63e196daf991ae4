//! HTTP liveness probe for the hosting platform. It answers `GET /healthz`
//! with `OK` and knows nothing about the catalog or the conversations.

use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use log::{error, info};

pub const HEALTH_PATH: &str = "/healthz";

pub fn router() -> Router {
    Router::new().route(HEALTH_PATH, get(health))
}

async fn health() -> &'static str {
    "OK"
}

/// Bind the probe port on the calling thread, so a taken port fails startup,
/// then serve it from a background thread with its own runtime.
pub fn spawn(port: u16) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("failed to bind healthcheck port {port}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure healthcheck socket")?;
    let addr = listener
        .local_addr()
        .context("failed to read healthcheck address")?;

    let handle = thread::Builder::new()
        .name("healthcheck".into())
        .spawn(move || {
            if let Err(err) = serve_blocking(listener) {
                error!("healthcheck server stopped: {err:#}");
            }
        })
        .context("failed to start healthcheck thread")?;

    info!("healthcheck listening on {addr}{HEALTH_PATH}");
    Ok((addr, handle))
}

fn serve_blocking(listener: TcpListener) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build healthcheck runtime")?;
    runtime.block_on(serve(listener))
}

async fn serve(listener: TcpListener) -> Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)
        .context("failed to register healthcheck socket")?;
    axum::serve(listener, router())
        .await
        .context("healthcheck server error")
}
