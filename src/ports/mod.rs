//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `StatsSource`: Per-cycle retrieval of the decoded stats document

pub mod stats_source;

pub use stats_source::StatsSource;
