//! Poller - Fixed-Interval Fetch and Project Loop
//!
//! Runs one cycle per interval: fetch the stats document, project it
//! onto the metric set, sleep. A failed fetch skips the cycle and
//! leaves the previous values in place. There is no backoff; every
//! cycle is identical regardless of earlier outcomes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use super::projector::MetricProjector;
use crate::adapters::metrics::{HealthState, ScreepsMetrics};
use crate::ports::StatsSource;

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
  /// A document was fetched and projected.
  Success,
  /// The source returned nothing; metrics untouched.
  Absent,
  /// The document had no keys; metrics untouched.
  Empty,
}

impl PollOutcome {
  /// Label value for `screeps_exporter_polls_total`.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Success => "success",
      Self::Absent => "absent",
      Self::Empty => "empty",
    }
  }
}

/// Drives the source and the projector on a fixed schedule.
pub struct Poller<S: StatsSource> {
  /// Where documents come from.
  source: Arc<S>,
  /// Where documents go.
  projector: MetricProjector,
  /// Readiness flag flipped on the first success.
  health: Arc<HealthState>,
  /// Sleep between cycles.
  interval: Duration,
}

impl<S: StatsSource> Poller<S> {
  /// Create a new poller.
  pub const fn new(
    source: Arc<S>,
    projector: MetricProjector,
    health: Arc<HealthState>,
    interval: Duration,
  ) -> Self {
    Self {
      source,
      projector,
      health,
      interval,
    }
  }

  /// Metric set the projector writes to.
  pub fn metrics(&self) -> &Arc<ScreepsMetrics> {
    self.projector.metrics()
  }

  /// Run one fetch + project cycle.
  #[instrument(skip(self))]
  pub async fn poll_once(&self) -> PollOutcome {
    let started = Instant::now();

    let outcome = match self.source.fetch().await {
      None => PollOutcome::Absent,
      Some(doc) if doc.is_empty() => {
        debug!("Stats document is empty, skipping projection");
        PollOutcome::Empty
      }
      Some(doc) => {
        self.projector.project(&doc);
        self.health.mark_success();
        PollOutcome::Success
      }
    };

    let metrics = self.metrics();
    metrics
      .polls_total
      .with_label_values(&[outcome.as_str()])
      .inc();
    metrics
      .poll_duration_seconds
      .observe(started.elapsed().as_secs_f64());
    if outcome == PollOutcome::Success {
      #[allow(clippy::cast_precision_loss)]
      let now = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
      metrics.last_success_timestamp_seconds.set(now);
    }

    outcome
  }

  /// Poll until the shutdown signal fires.
  ///
  /// The interval is slept in full after every cycle, however long the
  /// cycle took. Shutdown is observed only between cycles.
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
    info!(interval_s = self.interval.as_secs_f64(), "Poller started");

    loop {
      let outcome = self.poll_once().await;
      debug!(outcome = outcome.as_str(), "Poll cycle finished");

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Poller received shutdown signal");
          break;
        }
        () = tokio::time::sleep(self.interval) => {}
      }
    }

    info!("Poller stopped cleanly");
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use mockall::mock;
  use serde_json::json;

  use super::*;
  use crate::domain::StatsDocument;

  mock! {
    pub Source {}

    #[async_trait]
    impl StatsSource for Source {
      async fn fetch(&self) -> Option<StatsDocument>;
    }
  }

  fn poller(source: MockSource) -> Poller<MockSource> {
    let metrics = Arc::new(ScreepsMetrics::new().unwrap());
    Poller::new(
      Arc::new(source),
      MetricProjector::new(metrics),
      Arc::new(HealthState::new()),
      Duration::from_millis(10),
    )
  }

  fn polls(p: &Poller<MockSource>, outcome: PollOutcome) -> u64 {
    p.projector
      .metrics()
      .polls_total
      .with_label_values(&[outcome.as_str()])
      .get()
  }

  #[tokio::test]
  async fn test_absent_fetch_leaves_metrics_unchanged() {
    let mut source = MockSource::new();
    let mut seq = mockall::Sequence::new();
    source
      .expect_fetch()
      .times(1)
      .in_sequence(&mut seq)
      .returning(|| StatsDocument::from_value(json!({"cpu": {"bucket": 7000}})));
    source
      .expect_fetch()
      .times(1)
      .in_sequence(&mut seq)
      .returning(|| None);

    let p = poller(source);
    assert_eq!(p.poll_once().await, PollOutcome::Success);
    assert_eq!(p.poll_once().await, PollOutcome::Absent);

    assert_eq!(p.projector.metrics().cpu_bucket.get(), 7000.0);
    assert!(p.health.is_ready());
    assert_eq!(polls(&p, PollOutcome::Success), 1);
    assert_eq!(polls(&p, PollOutcome::Absent), 1);
    assert!(p.projector.metrics().last_success_timestamp_seconds.get() > 0.0);
  }

  #[tokio::test]
  async fn test_empty_document_is_not_projected() {
    let mut source = MockSource::new();
    source
      .expect_fetch()
      .returning(|| StatsDocument::from_value(json!({})));

    let p = poller(source);
    p.projector.metrics().tick.set(99.0);

    assert_eq!(p.poll_once().await, PollOutcome::Empty);
    assert_eq!(p.projector.metrics().tick.get(), 99.0);
    assert!(!p.health.is_ready());
  }

  #[tokio::test]
  async fn test_run_stops_on_shutdown() {
    let mut source = MockSource::new();
    source.expect_fetch().times(1..).returning(|| None);

    let p = Arc::new(poller(source));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let runner = Arc::clone(&p);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(35)).await;
    shutdown_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(2), handle)
      .await
      .expect("poller did not stop")
      .unwrap();
    assert!(polls(&p, PollOutcome::Absent) >= 1);
  }
}
