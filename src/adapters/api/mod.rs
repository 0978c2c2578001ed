//! Screeps Memory API Adapter
//!
//! Implements the HTTP side of the `StatsSource` port against the
//! Screeps `/api/user/memory` endpoint.
//!
//! Sub-modules:
//! - `client`: reqwest-based fetcher implementing `StatsSource`
//! - `error`: fetch failure classes
//! - `types`: response envelope types

pub mod client;
pub mod error;
pub mod types;

pub use client::{ScreepsClient, ScreepsClientConfig};
pub use error::FetchError;
