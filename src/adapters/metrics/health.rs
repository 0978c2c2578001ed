//! Health Endpoints - Liveness and Readiness Probes
//!
//! Exposes /live and /ready for Docker health checks. The exporter is
//! ready once a stats document has been projected at least once, and
//! stops being ready when shutdown begins.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

/// Shared health state, written by the poll loop and read by probes.
#[derive(Debug, Default)]
pub struct HealthState {
    /// Whether at least one document has been projected.
    has_data: AtomicBool,
    /// Whether graceful shutdown has started.
    shutting_down: AtomicBool,
}

impl HealthState {
    /// Create a new health state (not ready until the first success).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful projection.
    pub fn mark_success(&self) {
        self.has_data.store(true, Ordering::Relaxed);
    }

    /// Record that shutdown has started.
    pub fn mark_shutting_down(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
    }

    /// Check if the exporter has data to serve.
    pub fn is_ready(&self) -> bool {
        self.has_data.load(Ordering::Relaxed) && !self.shutting_down.load(Ordering::Relaxed)
    }
}

/// Router serving `/live` and `/ready`.
pub fn router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: returns 200 only once data has been exported.
async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_lifecycle() {
        let state = HealthState::new();
        assert!(!state.is_ready());
        state.mark_success();
        assert!(state.is_ready());
        state.mark_shutting_down();
        assert!(!state.is_ready());
    }
}
