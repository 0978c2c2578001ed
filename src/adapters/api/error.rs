//! Fetch failure classes for the memory API client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::DecodeError;

/// Why a fetch produced no document.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Connection, TLS, timeout or body-read failure.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
  /// Server answered with a non-success status.
  #[error("unexpected HTTP status {status}: {body}")]
  Status {
    /// Response status.
    status: StatusCode,
    /// Truncated response body.
    body: String,
  },
  /// Response body is not a JSON envelope.
  #[error("malformed envelope: {0}")]
  Envelope(#[source] serde_json::Error),
  /// Envelope carries a truthy `error` field.
  #[error("Screeps API error: {0}")]
  Api(String),
  /// Payload could not be decoded.
  #[error(transparent)]
  Decode(#[from] DecodeError),
  /// Payload decoded to something other than an object.
  #[error("payload is not a stats document (got {0})")]
  NotADocument(&'static str),
}
