//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, Prometheus, axum).
//!
//! Adapter categories:
//! - `api`: Screeps memory API client
//! - `metrics`: Prometheus metric set, scrape server and health checks

pub mod api;
pub mod metrics;
