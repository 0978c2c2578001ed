//! Stats Document - Untyped Memory Tree with Defaulting Reads
//!
//! The memory segment written by the game script is loosely typed:
//! sections come and go between script versions, counters can be
//! `null`, and spawn flags are sometimes booleans, sometimes 0/1.
//! Instead of a rigid schema, the document is kept as a JSON tree and
//! every read goes through [`Node`], which never fails and falls back
//! to a default.

use serde_json::{Map, Value};

/// A decoded stats document. Always a JSON object at the root.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsDocument {
    root: Value,
}

impl StatsDocument {
    /// Wrap a decoded value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self { root: value })
    }

    /// Parse a document from JSON text. Used by fixtures and benches.
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok().and_then(Self::from_value)
    }

    /// Root node for path walking.
    pub fn root(&self) -> Node<'_> {
        Node(Some(&self.root))
    }

    /// Shorthand for `root().get(key)`.
    pub fn section(&self, key: &str) -> Node<'_> {
        self.root().get(key)
    }

    /// True when the root object has no keys.
    pub fn is_empty(&self) -> bool {
        self.root.as_object().is_none_or(Map::is_empty)
    }

    /// Borrow the underlying JSON tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consume the document, returning the JSON tree.
    pub fn into_value(self) -> Value {
        self.root
    }
}

/// Cursor into a [`StatsDocument`]. A missing path is an absent node,
/// not an error.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(Option<&'a Value>);

impl<'a> Node<'a> {
    /// Child by key. Absent if this node is absent or not a mapping.
    pub fn get(self, key: &str) -> Self {
        Self(self.0.and_then(|v| v.get(key)))
    }

    /// Whether a non-null value exists at this position.
    pub fn is_present(self) -> bool {
        self.0.is_some_and(|v| !v.is_null())
    }

    /// Numeric value, or 0 when absent, null, or not numeric.
    pub fn number(self) -> f64 {
        self.number_or(0.0)
    }

    /// Numeric value with an explicit default.
    ///
    /// Booleans read as 1/0 and numeric strings are parsed, matching
    /// how the game script mixes representations.
    pub fn number_or(self, default: f64) -> f64 {
        match self.0 {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Key/child pairs of a mapping node. Empty for anything else.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, Node<'a>)> {
        self.0
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), Node(Some(v)))))
    }
}
