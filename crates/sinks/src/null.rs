//! Null sink - discards all data
//!
//! Receives batches, updates metrics, and immediately drops the data.
//!
//! # Use Cases
//!
//! - **Benchmarking**: measure pure pipeline throughput without sink
//!   bottlenecks
//! - **Wiring validation**: confirm batches reach publication without
//!   setting up external services

use std::sync::Arc;

use sluice_core::{Batch, Sink, WriteFuture};

use crate::metrics::{SinkMetrics, SinkMetricsSnapshot};

/// Sink that discards every batch it receives
pub struct NullSink {
    name: String,
    metrics: SinkMetrics,
}

impl NullSink {
    /// Create a null sink with the default name
    pub fn new() -> Self {
        Self::with_name("null")
    }

    /// Create a null sink with a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: SinkMetrics::new(),
        }
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for NullSink {
    fn write(&self, batch: Arc<Batch>) -> WriteFuture<'_> {
        Box::pin(async move {
            self.metrics
                .record_write(batch.count() as u64, batch.total_bytes() as u64);
            // Batch dropped here; if this was the last Arc, memory is freed.
            Ok(())
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
