//! Use Cases Layer - Application Workflows
//!
//! Orchestrates the domain model with the port interfaces.
//!
//! Use cases:
//! - `MetricProjector`: Stats document to gauges
//! - `Poller`: Fixed-interval fetch + project loop

pub mod poller;
pub mod projector;

pub use poller::{PollOutcome, Poller};
pub use projector::MetricProjector;
