//! Adapter implementations of the story ports.
//!
//! - [`memory`]: thread-safe in-memory adapters for tests and embedding
//! - [`postgres`]: `PostgreSQL` story persistence using Diesel
//! - [`logging::TracingNotifier`]: notifier that writes events to `tracing`

pub mod logging;
pub mod memory;
pub mod postgres;
