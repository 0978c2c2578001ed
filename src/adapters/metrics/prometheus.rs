//! Prometheus Metrics Registry - Screeps Game Stats
//!
//! Registers every gauge the exporter publishes. Game metrics follow
//! the `screeps_*` naming convention; the exporter's own health metrics
//! live under `screeps_exporter_*`.

use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use tracing::error;

/// The exporter's metric set. Built once at startup and shared by `Arc`
/// between the poll loop (writer) and the scrape handler (reader).
pub struct ScreepsMetrics {
    /// Prometheus registry.
    registry: Registry,

    /// Game tick as recorded in `Memory.stats`.
    pub tick: Gauge,
    /// CPU bucket level.
    pub cpu_bucket: Gauge,
    /// CPU used in the last tick.
    pub cpu_used: Gauge,

    /// GCL level.
    pub gcl_level: Gauge,
    /// GCL progress.
    pub gcl_progress: Gauge,
    /// GCL progress needed for the next level.
    pub gcl_progress_total: Gauge,
    /// GCL progress percent.
    pub gcl_progress_percent: Gauge,
    /// Number of owned colonies.
    pub gcl_colonies: Gauge,

    /// Total number of creeps.
    pub creeps_total: Gauge,

    /// RCL level per colony.
    pub colony_rcl_level: GaugeVec,
    /// RCL progress per colony.
    pub colony_rcl_progress: GaugeVec,
    /// RCL progress total per colony.
    pub colony_rcl_progress_total: GaugeVec,
    /// RCL progress percent per colony.
    pub colony_rcl_progress_percent: GaugeVec,
    /// Remote mining rooms per colony.
    pub colony_remote_mining_rooms: GaugeVec,
    /// Remote mining sources per colony.
    pub colony_remote_mining_sources: GaugeVec,
    /// Local + remote mining sources per colony.
    pub colony_mining_sources: GaugeVec,
    /// Spawn activity (1 = spawning, 0 = idle) per colony and spawn.
    pub colony_spawn_status: GaugeVec,

    /// Resource totals across storages and terminals.
    pub resource_amount: GaugeVec,

    /// Store fill percent per remote mining room.
    pub mining_store_percent: GaugeVec,

    /// Poll cycles by outcome (`success`, `absent`, `empty`).
    pub polls_total: IntCounterVec,
    /// Wall time of one fetch + projection.
    pub poll_duration_seconds: Histogram,
    /// Unix time of the last projected document.
    pub last_success_timestamp_seconds: Gauge,
}

impl ScreepsMetrics {
    /// Create and register all metrics on a fresh registry.
    ///
    /// # Errors
    /// Fails only on duplicate or malformed metric descriptors.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let tick = Gauge::new("screeps_tick", "Current tick according to Memory.stats")?;
        let cpu_bucket = Gauge::new("screeps_cpu_bucket", "Current CPU bucket")?;
        let cpu_used = Gauge::new("screeps_cpu_used", "CPU used in the last tick")?;

        let gcl_level = Gauge::new("screeps_gcl_level", "GCL Level")?;
        let gcl_progress = Gauge::new("screeps_gcl_progress", "GCL Progress")?;
        let gcl_progress_total = Gauge::new("screeps_gcl_progress_total", "GCL Progress Total")?;
        let gcl_progress_percent =
            Gauge::new("screeps_gcl_progress_percent", "GCL Progress Percent")?;
        let gcl_colonies = Gauge::new("screeps_gcl_colonies", "Number of owned colonies")?;

        let creeps_total = Gauge::new("screeps_creeps_total", "Total number of creeps")?;

        let colony = |name: &str, help: &str| {
            GaugeVec::new(Opts::new(name, help), &["colony"])
        };
        let colony_rcl_level = colony("screeps_colony_rcl_level", "RCL Level per colony")?;
        let colony_rcl_progress = colony("screeps_colony_rcl_progress", "RCL progress")?;
        let colony_rcl_progress_total =
            colony("screeps_colony_rcl_progress_total", "RCL progress total")?;
        let colony_rcl_progress_percent =
            colony("screeps_colony_rcl_progress_percent", "RCL progress percent")?;
        let colony_remote_mining_rooms = colony(
            "screeps_colony_remote_mining_rooms",
            "Number of remote mining rooms",
        )?;
        let colony_remote_mining_sources = colony(
            "screeps_colony_remote_mining_sources",
            "Number of remote mining sources",
        )?;
        let colony_mining_sources = colony(
            "screeps_colony_mining_sources",
            "Sum of local+remote mining sources",
        )?;

        let colony_spawn_status = GaugeVec::new(
            Opts::new(
                "screeps_colony_spawn_status",
                "Spawn is actively spawning (1=Yes,0=No)",
            ),
            &["colony", "spawn"],
        )?;

        let resource_amount = GaugeVec::new(
            Opts::new(
                "screeps_resource_amount",
                "Total resources across all storages/terminals",
            ),
            &["resource"],
        )?;

        let mining_store_percent = GaugeVec::new(
            Opts::new(
                "screeps_mining_store_percent",
                "Store percent for remote mining rooms",
            ),
            &["room"],
        )?;

        let polls_total = IntCounterVec::new(
            Opts::new("screeps_exporter_polls_total", "Poll cycles by outcome"),
            &["outcome"],
        )?;

        let poll_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "screeps_exporter_poll_duration_seconds",
                "Wall time of one fetch and projection",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        let last_success_timestamp_seconds = Gauge::new(
            "screeps_exporter_last_success_timestamp_seconds",
            "Unix time of the last successfully projected stats document",
        )?;

        // Register all metrics
        registry.register(Box::new(tick.clone()))?;
        registry.register(Box::new(cpu_bucket.clone()))?;
        registry.register(Box::new(cpu_used.clone()))?;
        registry.register(Box::new(gcl_level.clone()))?;
        registry.register(Box::new(gcl_progress.clone()))?;
        registry.register(Box::new(gcl_progress_total.clone()))?;
        registry.register(Box::new(gcl_progress_percent.clone()))?;
        registry.register(Box::new(gcl_colonies.clone()))?;
        registry.register(Box::new(creeps_total.clone()))?;
        registry.register(Box::new(colony_rcl_level.clone()))?;
        registry.register(Box::new(colony_rcl_progress.clone()))?;
        registry.register(Box::new(colony_rcl_progress_total.clone()))?;
        registry.register(Box::new(colony_rcl_progress_percent.clone()))?;
        registry.register(Box::new(colony_remote_mining_rooms.clone()))?;
        registry.register(Box::new(colony_remote_mining_sources.clone()))?;
        registry.register(Box::new(colony_mining_sources.clone()))?;
        registry.register(Box::new(colony_spawn_status.clone()))?;
        registry.register(Box::new(resource_amount.clone()))?;
        registry.register(Box::new(mining_store_percent.clone()))?;
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;
        registry.register(Box::new(last_success_timestamp_seconds.clone()))?;

        Ok(Self {
            registry,
            tick,
            cpu_bucket,
            cpu_used,
            gcl_level,
            gcl_progress,
            gcl_progress_total,
            gcl_progress_percent,
            gcl_colonies,
            creeps_total,
            colony_rcl_level,
            colony_rcl_progress,
            colony_rcl_progress_total,
            colony_rcl_progress_percent,
            colony_remote_mining_rooms,
            colony_remote_mining_sources,
            colony_mining_sources,
            colony_spawn_status,
            resource_amount,
            mining_store_percent,
            polls_total,
            poll_duration_seconds,
            last_success_timestamp_seconds,
        })
    }

    /// Gathered metric families, for inspection.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    /// Fails if encoding fails or produces non-UTF-8 output.
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Encoded metrics are not UTF-8")
    }

    /// Router serving `GET /metrics`.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&self);
                async move { metrics.scrape() }
            }),
        )
    }

    fn scrape(&self) -> axum::response::Response {
        match self.encode_text() {
            Ok(body) => (
                [(axum::http::header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "Metrics scrape failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
            }
        }
    }
}
