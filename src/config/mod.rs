//! Configuration Module - TOML + Environment Exporter Configuration
//!
//! Loads configuration from an optional `config.toml`, then applies
//! environment variable overrides (`SCREEPS_TOKEN`, `SCREEPS_SHARD`,
//! `SCREEPS_MEMORY_PATH`, `SCRAPE_INTERVAL`, ...). Every field has a
//! default, so the exporter starts with no file and no env at all.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Process-level settings (logging).
  pub exporter: ExporterConfig,
  /// Screeps API connection.
  pub screeps: ScreepsConfig,
  /// Poll loop timing.
  pub poll: PollConfig,
  /// Scrape endpoint.
  pub metrics: MetricsConfig,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// Human-readable lines on stdout.
  #[default]
  Text,
  /// One JSON object per line.
  Json,
}

impl std::str::FromStr for LogFormat {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      other => Err(anyhow::anyhow!("unknown log format '{other}' (expected text or json)")),
    }
  }
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
  pub log_level: String,
  /// Log output format.
  pub log_format: LogFormat,
}

impl Default for ExporterConfig {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
      log_format: LogFormat::default(),
    }
  }
}

/// Screeps memory API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ScreepsConfig {
  /// API base URL (official server or a private one).
  pub api_url: String,
  /// Auth token, sent as the `_token` query parameter.
  pub token: String,
  /// Shard holding the memory segment.
  pub shard: String,
  /// Memory path to read (e.g. `stats` for `Memory.stats`).
  pub memory_path: String,
  /// Request timeout in seconds.
  pub timeout_seconds: u64,
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for ScreepsConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ScreepsConfig")
      .field("api_url", &self.api_url)
      .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
      .field("shard", &self.shard)
      .field("memory_path", &self.memory_path)
      .field("timeout_seconds", &self.timeout_seconds)
      .finish()
  }
}

impl Default for ScreepsConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      token: String::new(),
      shard: default_shard(),
      memory_path: default_memory_path(),
      timeout_seconds: default_timeout(),
    }
  }
}

impl ScreepsConfig {
  /// Request timeout as a `Duration`.
  pub const fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_seconds)
  }
}

/// Poll loop settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
  /// Seconds to sleep between cycles. Fractional values allowed.
  pub interval_seconds: f64,
}

impl Default for PollConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_interval(),
    }
  }
}

impl PollConfig {
  /// Interval as a `Duration`. Only valid after validation.
  pub fn interval(&self) -> Duration {
    Duration::from_secs_f64(self.interval_seconds)
  }
}

/// Scrape endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Bind address for `/metrics`, `/live` and `/ready`.
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions

fn default_log_level() -> String {
  "info".to_string()
}

fn default_api_url() -> String {
  "https://screeps.com".to_string()
}

fn default_shard() -> String {
  "shard0".to_string()
}

fn default_memory_path() -> String {
  "stats".to_string()
}

const fn default_timeout() -> u64 {
  10
}

const fn default_interval() -> f64 {
  15.0
}

fn default_metrics_addr() -> String {
  "0.0.0.0:8000".to_string()
}
