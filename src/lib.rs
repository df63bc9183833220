// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod auth;
pub mod config;
pub mod metrics;
pub mod sink;
pub mod transport;
pub mod wire;

// Polling engine (watermarks, freshness, pagination, classification, cursor)
pub mod poll;

// ---- Re-exports for stable public API ----
pub use crate::config::PollerConfig;
pub use crate::poll::{PollEngine, TickOutcome};
pub use crate::sink::{Signal, SignalSink, SinkMux};
pub use crate::transport::{RawResponse, Transport};
