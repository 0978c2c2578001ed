//! Screeps Exporter — Entry Point
//!
//! Polls `Memory.stats` from the Screeps API and republishes it as
//! Prometheus gauges. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (optional) + env overrides, validate
//! 2. Init tracing (text or JSON), then log the config summary
//! 3. Create the shutdown broadcast channel
//! 4. Register the metric set + health state
//! 5. Create the Screeps HTTP client (StatsSource port)
//! 6. Spawn the scrape server (/metrics, /live, /ready)
//! 7. Spawn the poller loop
//! 8. Wait for SIGINT → graceful shutdown (stop poller, drain server)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use screeps_exporter::adapters::api::{ScreepsClient, ScreepsClientConfig};
use screeps_exporter::adapters::metrics::{server, HealthState, ScreepsMetrics};
use screeps_exporter::config::{self, ExporterConfig, LogFormat};
use screeps_exporter::usecases::{MetricProjector, Poller};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config().context("Failed to load configuration")?;

    // ── 2. Initialize logging ───────────────────────────────
    init_tracing(&config.exporter);
    config::loader::log_config_summary(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        shard = %config.screeps.shard,
        path = %config.screeps.memory_path,
        interval_s = config.poll.interval_seconds,
        "Starting Screeps Exporter"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. Metric set + health state ────────────────────────
    let metrics = Arc::new(ScreepsMetrics::new().context("Failed to register metrics")?);
    let health = Arc::new(HealthState::new());

    // ── 5. Screeps API client (StatsSource port) ────────────
    let client = Arc::new(
        ScreepsClient::new(ScreepsClientConfig::from(&config.screeps))
            .context("Failed to create Screeps client")?,
    );

    // ── 6. Scrape server on :8000 ───────────────────────────
    let mut server_handle = tokio::spawn(server::serve(
        config.metrics.bind_address.clone(),
        Arc::clone(&metrics),
        Arc::clone(&health),
        shutdown_tx.subscribe(),
    ));

    // ── 7. Poller loop ──────────────────────────────────────
    let poller = Poller::new(
        client,
        MetricProjector::new(Arc::clone(&metrics)),
        Arc::clone(&health),
        config.poll.interval(),
    );
    let poller_shutdown = shutdown_tx.subscribe();
    let poller_handle = tokio::spawn(async move { poller.run(poller_shutdown).await });

    // ── 8. Wait for SIGINT or a dead scrape server ──────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        result = &mut server_handle => {
            let _ = shutdown_tx.send(());
            let _ = tokio::time::timeout(Duration::from_secs(5), poller_handle).await;
            return match result {
                Ok(Ok(())) => Err(anyhow::anyhow!("Metrics server exited unexpectedly")),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(e).context("Metrics server task panicked"),
            };
        }
    }

    // ── Graceful shutdown ───────────────────────────────────
    health.mark_shutting_down();
    let _ = shutdown_tx.send(());

    if tokio::time::timeout(Duration::from_secs(15), poller_handle)
        .await
        .is_err()
    {
        error!("Poller did not stop within 15s");
    }

    match tokio::time::timeout(Duration::from_secs(5), server_handle).await {
        Ok(Ok(Err(e))) => error!(error = %e, "Metrics server failed during shutdown"),
        Err(_) => error!("Metrics server did not stop within 5s"),
        _ => {}
    }

    info!("Shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(exporter: &ExporterConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&exporter.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match exporter.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
