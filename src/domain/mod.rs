//! Domain layer - Stats document model and payload codec.
//!
//! Pure decoding logic with no I/O (hexagonal architecture inner ring).
//! Everything here is testable in isolation.

pub mod document;
pub mod payload;

// Re-export core types for convenience
pub use document::{Node, StatsDocument};
pub use payload::{COMPRESSION_MARKER, DecodeError, decode_payload, encode_compressed};
