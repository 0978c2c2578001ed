//! Metric Projector - Stats Document to Prometheus Gauges
//!
//! Walks the decoded document by fixed paths and writes every value
//! into its gauge. Label-indexed families are reset before their
//! section is read, so colonies, resources, rooms and spawns that
//! disappear from the document also disappear from the scrape.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::adapters::metrics::ScreepsMetrics;
use crate::domain::{Node, StatsDocument};

/// Projects stats documents onto the shared metric set.
pub struct MetricProjector {
  /// Process-wide metric set.
  metrics: Arc<ScreepsMetrics>,
}

impl MetricProjector {
  /// Create a projector writing into `metrics`.
  pub const fn new(metrics: Arc<ScreepsMetrics>) -> Self {
    Self { metrics }
  }

  /// Shared metric set this projector writes to.
  pub fn metrics(&self) -> &Arc<ScreepsMetrics> {
    &self.metrics
  }

  /// Update every metric from `doc`. Missing fields read as 0.
  #[instrument(skip_all)]
  pub fn project(&self, doc: &StatsDocument) {
    self.project_cpu(doc.section("cpu"));
    self.project_gcl(doc.section("gcl"));
    self.project_creeps(doc.section("creeps"));
    let colonies = self.project_colonies(doc.section("colonies"));
    let resources = self.project_resources(doc.section("resources"));
    let rooms = self.project_mining(doc.section("mining"));

    debug!(colonies, resources, rooms, "Stats projected");
  }

  fn project_cpu(&self, cpu: Node<'_>) {
    let m = &self.metrics;
    m.tick.set(cpu.get("tick").number());
    m.cpu_bucket.set(cpu.get("bucket").number());
    m.cpu_used.set(cpu.get("used").number());
  }

  fn project_gcl(&self, gcl: Node<'_>) {
    let m = &self.metrics;
    m.gcl_level.set(gcl.get("level").number());
    m.gcl_progress.set(gcl.get("progress").number());
    m.gcl_progress_total.set(gcl.get("progress_total").number());
    m.gcl_progress_percent.set(gcl.get("progress_percent").number());
    m.gcl_colonies.set(gcl.get("colonies").number());
  }

  fn project_creeps(&self, creeps: Node<'_>) {
    self.metrics.creeps_total.set(creeps.get("total").number());
  }

  /// Returns the number of colonies written.
  fn project_colonies(&self, colonies: Node<'_>) -> usize {
    let m = &self.metrics;
    m.colony_rcl_level.reset();
    m.colony_rcl_progress.reset();
    m.colony_rcl_progress_total.reset();
    m.colony_rcl_progress_percent.reset();
    m.colony_remote_mining_rooms.reset();
    m.colony_remote_mining_sources.reset();
    m.colony_mining_sources.reset();
    m.colony_spawn_status.reset();

    let mut count = 0;
    for (name, colony) in colonies.entries() {
      let labels = &[name];

      let rcl = colony.get("rcl");
      m.colony_rcl_level.with_label_values(labels).set(rcl.get("level").number());
      m.colony_rcl_progress.with_label_values(labels).set(rcl.get("progress").number());
      m.colony_rcl_progress_total
        .with_label_values(labels)
        .set(rcl.get("progress_total").number());
      m.colony_rcl_progress_percent
        .with_label_values(labels)
        .set(rcl.get("progress_percent").number());

      let remote = colony.get("remote_mining");
      m.colony_remote_mining_rooms
        .with_label_values(labels)
        .set(remote.get("rooms").number());
      m.colony_remote_mining_sources
        .with_label_values(labels)
        .set(remote.get("sources").number());
      m.colony_mining_sources
        .with_label_values(labels)
        .set(colony.get("mining_sources").number());

      for (spawn, spawning) in colony.get("spawns").entries() {
        m.colony_spawn_status
          .with_label_values(&[name, spawn])
          .set(spawning.number());
      }
      count += 1;
    }
    count
  }

  /// Returns the number of resources written.
  fn project_resources(&self, resources: Node<'_>) -> usize {
    let m = &self.metrics;
    m.resource_amount.reset();

    let mut count = 0;
    for (resource, amount) in resources.entries() {
      m.resource_amount.with_label_values(&[resource]).set(amount.number());
      count += 1;
    }
    count
  }

  /// Returns the number of mining rooms written.
  fn project_mining(&self, mining: Node<'_>) -> usize {
    let m = &self.metrics;
    m.mining_store_percent.reset();

    let mut count = 0;
    for (room, info) in mining.entries() {
      // null and missing both export as 0 rather than dropping the room
      m.mining_store_percent
        .with_label_values(&[room])
        .set(info.get("store_percent").number());
      count += 1;
    }
    count
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn projector() -> MetricProjector {
    MetricProjector::new(Arc::new(ScreepsMetrics::new().unwrap()))
  }

  fn doc(value: serde_json::Value) -> StatsDocument {
    StatsDocument::from_value(value).unwrap()
  }

  /// Label values of every series in a family, sorted.
  fn series(metrics: &ScreepsMetrics, name: &str) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = metrics
      .gather()
      .iter()
      .filter(|mf| mf.get_name() == name)
      .flat_map(|mf| mf.get_metric().iter())
      .map(|m| m.get_label().iter().map(|l| l.get_value().to_string()).collect())
      .collect();
    out.sort();
    out
  }

  #[test]
  fn test_scalars_from_full_document() {
    let p = projector();
    p.project(&doc(json!({
      "cpu": {"bucket": 9000, "used": 12.3, "tick": 555},
      "gcl": {"level": 10, "progress": 500, "progress_total": 1000, "progress_percent": 50, "colonies": 3},
      "creeps": {"total": 42}
    })));

    let m = p.metrics();
    assert_eq!(m.tick.get(), 555.0);
    assert_eq!(m.cpu_bucket.get(), 9000.0);
    assert_eq!(m.cpu_used.get(), 12.3);
    assert_eq!(m.gcl_level.get(), 10.0);
    assert_eq!(m.gcl_progress.get(), 500.0);
    assert_eq!(m.gcl_progress_total.get(), 1000.0);
    assert_eq!(m.gcl_progress_percent.get(), 50.0);
    assert_eq!(m.gcl_colonies.get(), 3.0);
    assert_eq!(m.creeps_total.get(), 42.0);
  }

  #[test]
  fn test_missing_sections_degrade_to_zero() {
    let p = projector();
    p.project(&doc(json!({"cpu": {"bucket": 100}})));
    p.project(&doc(json!({"unrelated": [1, 2, 3], "colonies": {"W1N1": null}})));

    let m = p.metrics();
    assert_eq!(m.cpu_bucket.get(), 0.0);
    assert_eq!(m.gcl_level.get(), 0.0);
    assert_eq!(m.creeps_total.get(), 0.0);
    assert_eq!(m.colony_rcl_level.with_label_values(&["W1N1"]).get(), 0.0);
    assert!(series(m, "screeps_colony_spawn_status").is_empty());
  }

  #[test]
  fn test_colony_spawns_and_mining() {
    let p = projector();
    p.project(&doc(json!({
      "colonies": {
        "W1N1": {
          "rcl": {"level": 7, "progress": 100, "progress_total": 200, "progress_percent": 50},
          "remote_mining": {"rooms": 2, "sources": 4},
          "mining_sources": 5,
          "spawns": {"Spawn1": true, "Spawn2": 0}
        }
      }
    })));

    let m = p.metrics();
    assert_eq!(m.colony_rcl_level.with_label_values(&["W1N1"]).get(), 7.0);
    assert_eq!(m.colony_rcl_progress_percent.with_label_values(&["W1N1"]).get(), 50.0);
    assert_eq!(m.colony_remote_mining_rooms.with_label_values(&["W1N1"]).get(), 2.0);
    assert_eq!(m.colony_remote_mining_sources.with_label_values(&["W1N1"]).get(), 4.0);
    assert_eq!(m.colony_mining_sources.with_label_values(&["W1N1"]).get(), 5.0);
    assert_eq!(
      series(m, "screeps_colony_spawn_status"),
      vec![
        vec!["W1N1".to_string(), "Spawn1".to_string()],
        vec!["W1N1".to_string(), "Spawn2".to_string()],
      ]
    );
    assert_eq!(m.colony_spawn_status.with_label_values(&["W1N1", "Spawn1"]).get(), 1.0);
    assert_eq!(m.colony_spawn_status.with_label_values(&["W1N1", "Spawn2"]).get(), 0.0);
  }

  #[test]
  fn test_stale_labels_are_cleared() {
    let p = projector();
    p.project(&doc(json!({
      "colonies": {"W1N1": {"spawns": {"Spawn1": 1}}, "W2N2": {"spawns": {"Spawn2": 1}}},
      "resources": {"energy": 1000, "power": 5},
      "mining": {"W1N2": {"store_percent": 10}, "W3N3": {"store_percent": 20}}
    })));
    p.project(&doc(json!({
      "colonies": {"W2N2": {"spawns": {"Spawn3": 0}}},
      "resources": {"energy": 2000},
      "mining": {}
    })));

    let m = p.metrics();
    assert_eq!(series(m, "screeps_colony_rcl_level"), vec![vec!["W2N2".to_string()]]);
    assert_eq!(series(m, "screeps_colony_mining_sources"), vec![vec!["W2N2".to_string()]]);
    assert_eq!(
      series(m, "screeps_colony_spawn_status"),
      vec![vec!["W2N2".to_string(), "Spawn3".to_string()]]
    );
    assert_eq!(series(m, "screeps_resource_amount"), vec![vec!["energy".to_string()]]);
    assert_eq!(m.resource_amount.with_label_values(&["energy"]).get(), 2000.0);
    assert!(series(m, "screeps_mining_store_percent").is_empty());
  }

  #[test]
  fn test_null_store_percent_exports_zero() {
    let p = projector();
    p.project(&doc(json!({"mining": {"roomA": {"store_percent": null}, "roomB": {}}})));

    let m = p.metrics();
    assert_eq!(
      series(m, "screeps_mining_store_percent"),
      vec![vec!["roomA".to_string()], vec!["roomB".to_string()]]
    );
    assert_eq!(m.mining_store_percent.with_label_values(&["roomA"]).get(), 0.0);
  }
}
