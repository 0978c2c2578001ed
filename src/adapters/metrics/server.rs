//! Scrape Server - `/metrics`, `/live` and `/ready` on one port.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use super::health::{self, HealthState};
use super::prometheus::ScreepsMetrics;

/// Build the full scrape router.
pub fn router(metrics: Arc<ScreepsMetrics>, health: Arc<HealthState>) -> axum::Router {
    metrics.router().merge(health::router(health))
}

/// Bind `bind_address` and serve until the shutdown signal fires.
///
/// # Errors
/// Fails if the address cannot be bound or the server errors out.
#[instrument(skip(metrics, health, shutdown_rx))]
pub async fn serve(
    bind_address: String,
    metrics: Arc<ScreepsMetrics>,
    health: Arc<HealthState>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind metrics server on {bind_address}"))?;

    info!(address = %bind_address, "Screeps Exporter listening for Prometheus scraping");

    axum::serve(listener, router(metrics, health))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("Metrics server failed")?;

    Ok(())
}
