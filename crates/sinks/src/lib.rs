//! Sluice - Sinks
//!
//! Sink implementations plus the shared metrics they all report.
//!
//! # Overview
//!
//! Sinks implement the [`sluice_core::Sink`] contract: an async `write` for
//! one `Arc<Batch>`. The pipeline fans a batch out to every sink
//! concurrently and waits for all of them, so a sink's `write` should
//! resolve in bounded time under normal operation.
//!
//! - [`NullSink`] - discards batches, counting them; benchmarking and wiring
//!   validation
//! - [`StdoutSink`] - line-oriented debug output; not for production
//!   throughput
//! - [`CollectSink`] - keeps every batch in memory; integration tests

mod collect;
mod metrics;
mod null;
mod stdout;

pub use collect::CollectSink;
pub use metrics::{SinkMetrics, SinkMetricsSnapshot};
pub use null::NullSink;
pub use stdout::{StdoutConfig, StdoutSink};
