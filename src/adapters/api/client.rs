//! Screeps HTTP Client - Memory Segment Fetcher
//!
//! Wraps reqwest to read one memory path per call from the Screeps
//! `/api/user/memory` endpoint, unwrap the envelope and decode the
//! payload into a [`StatsDocument`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::FetchError;
use super::types::MemoryEnvelope;
use crate::config::ScreepsConfig;
use crate::domain::{StatsDocument, decode_payload};
use crate::ports::StatsSource;

/// Path of the memory endpoint relative to the API base URL.
pub const MEMORY_ENDPOINT: &str = "/api/user/memory";

/// Longest error body kept in a `FetchError::Status`.
const MAX_ERROR_BODY: usize = 256;

/// Configuration for the Screeps HTTP client.
#[derive(Clone)]
pub struct ScreepsClientConfig {
  /// Base URL for the API (no trailing path).
  pub base_url: String,
  /// Auth token sent as `_token`.
  pub token: String,
  /// Shard to read from.
  pub shard: String,
  /// Memory path to read.
  pub memory_path: String,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for ScreepsClientConfig {
  fn default() -> Self {
    Self::from(&ScreepsConfig::default())
  }
}

impl From<&ScreepsConfig> for ScreepsClientConfig {
  fn from(config: &ScreepsConfig) -> Self {
    Self {
      base_url: config.api_url.trim_end_matches('/').to_string(),
      token: config.token.clone(),
      shard: config.shard.clone(),
      memory_path: config.memory_path.clone(),
      timeout: config.timeout(),
    }
  }
}

/// HTTP client for the Screeps memory API.
pub struct ScreepsClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ScreepsClientConfig,
  /// Full endpoint URL, built once.
  url: String,
}

impl ScreepsClient {
  /// Create a new client.
  ///
  /// # Errors
  /// Fails if the TLS backend cannot be initialised.
  pub fn new(config: ScreepsClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("screeps-exporter/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;

    let url = format!("{}{}", config.base_url, MEMORY_ENDPOINT);

    Ok(Self { http, config, url })
  }

  /// Fetch and decode the memory path, reporting why it failed.
  ///
  /// # Errors
  /// See [`FetchError`] for the failure classes.
  #[instrument(skip(self), fields(shard = %self.config.shard, path = %self.config.memory_path))]
  pub async fn try_fetch(&self) -> Result<StatsDocument, FetchError> {
    let response = self
      .http
      .get(&self.url)
      .query(&[
        ("shard", self.config.shard.as_str()),
        ("path", self.config.memory_path.as_str()),
        ("_token", self.config.token.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(FetchError::Status {
        status,
        body: truncate_chars(&body, MAX_ERROR_BODY),
      });
    }

    let bytes = response.bytes().await?;
    debug!(bytes = bytes.len(), "Memory response received");

    let envelope: MemoryEnvelope = serde_json::from_slice(&bytes).map_err(FetchError::Envelope)?;
    if let Some(error) = envelope.api_error() {
      let message = match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      };
      return Err(FetchError::Api(message));
    }

    let decoded = decode_payload(envelope.data)?;
    let kind = value_kind(&decoded);
    StatsDocument::from_value(decoded).ok_or(FetchError::NotADocument(kind))
  }
}

#[async_trait]
impl StatsSource for ScreepsClient {
  async fn fetch(&self) -> Option<StatsDocument> {
    match self.try_fetch().await {
      Ok(doc) => Some(doc),
      Err(e) => {
        warn!(error = %e, shard = %self.config.shard, "Error fetching Screeps data");
        None
      }
    }
  }
}

fn truncate_chars(text: &str, max: usize) -> String {
  text.chars().take(max).collect()
}

const fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}
