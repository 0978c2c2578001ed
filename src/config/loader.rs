//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading the optional `config.toml`, layering environment
//! variables on top, validating the result, and providing clear error
//! messages for misconfiguration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{AppConfig, LogFormat};

/// Env var naming the config file path.
pub const CONFIG_PATH_ENV: &str = "SCREEPS_EXPORTER_CONFIG";

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Load configuration from the process environment.
///
/// Reads the file named by `SCREEPS_EXPORTER_CONFIG` (or `config.toml`),
/// falling back to defaults if it does not exist, then applies env
/// overrides and validates.
///
/// # Errors
/// Returns a detailed error if the file exists but cannot be read or
/// parsed, if an env override is malformed, or if validation fails.
pub fn load_config() -> Result<AppConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
  load_config_with(&path, |key| std::env::var(key).ok())
}

/// Load configuration from `path` with a custom env lookup.
///
/// A missing file is not an error: every field has a default.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with<F>(path: &str, env: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let path = Path::new(path);

  let mut config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
      .with_context(|| format!("Failed to parse config file: {}", path.display()))?
  } else {
    AppConfig::default()
  };

  apply_env_overrides(&mut config, env)?;
  validate_config(&config)?;

  Ok(config)
}

/// Log the loaded configuration and any non-fatal problems with it.
///
/// Loading happens before the subscriber exists, so the caller invokes
/// this once tracing is initialised.
pub fn log_config_summary(config: &AppConfig) {
  if config.screeps.token.is_empty() {
    warn!("SCREEPS_TOKEN is empty; the memory API will reject requests");
  }

  info!(
    shard = %config.screeps.shard,
    path = %config.screeps.memory_path,
    interval_s = config.poll.interval_seconds,
    bind = %config.metrics.bind_address,
    "Configuration loaded successfully"
  );
}

/// Parse TOML text into a config. Missing keys take their defaults.
///
/// # Errors
/// Returns the TOML error for malformed input or mistyped values.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Invalid TOML")
}

/// Apply environment variable overrides on top of `config`.
///
/// # Errors
/// Fails if a numeric or enum override cannot be parsed.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(token) = env("SCREEPS_TOKEN") {
    config.screeps.token = token;
  }
  if let Some(shard) = env("SCREEPS_SHARD") {
    config.screeps.shard = shard;
  }
  if let Some(path) = env("SCREEPS_MEMORY_PATH") {
    config.screeps.memory_path = path;
  }
  if let Some(url) = env("SCREEPS_API_URL") {
    config.screeps.api_url = url;
  }
  if let Some(interval) = env("SCRAPE_INTERVAL") {
    config.poll.interval_seconds = interval
      .trim()
      .parse()
      .with_context(|| format!("SCRAPE_INTERVAL must be a number of seconds, got '{interval}'"))?;
  }
  if let Some(bind) = env("METRICS_BIND_ADDRESS") {
    config.metrics.bind_address = bind;
  }
  if let Some(level) = env("LOG_LEVEL") {
    config.exporter.log_level = level;
  }
  if let Some(format) = env("LOG_FORMAT") {
    config.exporter.log_format = format.parse::<LogFormat>()?;
  }
  Ok(())
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A positive poll interval that fits in a `Duration`
/// - A positive request timeout
/// - Non-empty shard and memory path
/// - An http(s) API URL and a non-empty bind address
fn validate_config(config: &AppConfig) -> Result<()> {
  let interval = config.poll.interval_seconds;
  anyhow::ensure!(
    interval > 0.0 && Duration::try_from_secs_f64(interval).is_ok(),
    "poll interval must be a positive number of seconds, got {interval}"
  );

  anyhow::ensure!(
    config.screeps.timeout_seconds > 0,
    "request timeout must be positive"
  );
  anyhow::ensure!(!config.screeps.shard.trim().is_empty(), "shard must not be empty");
  anyhow::ensure!(
    !config.screeps.memory_path.trim().is_empty(),
    "memory path must not be empty"
  );

  let url = config.screeps.api_url.as_str();
  anyhow::ensure!(
    url.starts_with("http://") || url.starts_with("https://"),
    "Screeps API URL must start with http:// or https://, got '{url}'"
  );

  anyhow::ensure!(
    !config.metrics.bind_address.is_empty(),
    "metrics bind address must not be empty"
  );

  Ok(())
}
