//! Stdout sink - human-readable debug output
//!
//! Writes each record payload as one line to stdout. Not intended for
//! production use at high throughput; its place is development wiring and
//! quick inspection of what survives the processor chain.

use std::io::Write;
use std::sync::Arc;

use sluice_core::{Batch, Sink, SinkError, WriteFuture};

use crate::metrics::{SinkMetrics, SinkMetricsSnapshot};

/// Configuration for [`StdoutSink`]
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    /// Maximum records printed per batch (0 = all)
    pub max_records: usize,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self { max_records: 0 }
    }
}

/// Sink that prints record payloads line by line
pub struct StdoutSink {
    name: String,
    config: StdoutConfig,
    metrics: SinkMetrics,
}

impl StdoutSink {
    /// Create a stdout sink with default configuration
    pub fn new() -> Self {
        Self::with_config(StdoutConfig::default())
    }

    /// Create a stdout sink with the given configuration
    pub fn with_config(config: StdoutConfig) -> Self {
        Self {
            name: "stdout".into(),
            config,
            metrics: SinkMetrics::new(),
        }
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn print_batch(&self, batch: &Batch) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        let limit = if self.config.max_records == 0 {
            batch.count()
        } else {
            self.config.max_records.min(batch.count())
        };

        for record in batch.iter().take(limit) {
            out.write_all(record.payload())?;
            out.write_all(b"\n")?;
        }

        if limit < batch.count() {
            writeln!(out, "... {} more records", batch.count() - limit)?;
        }

        out.flush()
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StdoutSink {
    fn write(&self, batch: Arc<Batch>) -> WriteFuture<'_> {
        Box::pin(async move {
            if let Err(e) = self.print_batch(&batch) {
                self.metrics.record_error();
                return Err(SinkError::from(e));
            }

            self.metrics
                .record_write(batch.count() as u64, batch.total_bytes() as u64);
            Ok(())
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
