//! Memory API Response Types
//!
//! Envelope returned by `GET /api/user/memory`. The payload itself stays
//! an untyped `serde_json::Value` until the codec has looked at it.

use serde::Deserialize;
use serde_json::Value;

/// Response envelope from the memory endpoint.
///
/// Typical shapes: `{"ok":1,"data":"gz:H4sI..."}`, `{"ok":1,"data":{...}}`
/// or `{"error":"unauthorized"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryEnvelope {
  /// Success flag set by the server (usually 1). Informational only;
  /// any JSON type is accepted.
  #[serde(default)]
  pub ok: Option<Value>,
  /// Memory payload. `Null` when the key is missing or the path is unset.
  #[serde(default)]
  pub data: Value,
  /// API-reported error, any JSON type.
  #[serde(default)]
  pub error: Option<Value>,
}

impl MemoryEnvelope {
  /// Error indicator if it is truthy (non-empty, non-zero, non-false).
  pub fn api_error(&self) -> Option<&Value> {
    self.error.as_ref().filter(|e| is_truthy(e))
  }
}

/// JSON truthiness as the memory API clients interpret it.
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
  }
}
