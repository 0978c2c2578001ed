//! Metrics and Monitoring Adapters
//!
//! Holds the Prometheus metric set the exporter publishes and the
//! axum 0.7 server exposing it next to the health probes.

pub mod health;
pub mod prometheus;
pub mod server;

pub use health::HealthState;
pub use prometheus::ScreepsMetrics;
