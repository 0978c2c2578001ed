//! Stats Source Port - Memory Segment Retrieval Interface
//!
//! Defines how the poll loop obtains one stats document per cycle.
//! The loop does not care whether the document came over HTTP, from a
//! fixture, or from a mock.

use async_trait::async_trait;

use crate::domain::StatsDocument;

/// Source of decoded stats documents.
///
/// Implementors absorb every failure (transport, API error, decoding)
/// and report it by returning `None`; the caller simply skips the cycle.
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
  /// Fetch and decode the current stats document, or `None` on any failure.
  async fn fetch(&self) -> Option<StatsDocument>;
}
