//! Pipeline worker metrics
//!
//! Atomic counters for observing the worker loop. All operations use
//! relaxed ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one pipeline worker
///
/// Shared as an `Arc` so observers keep a valid handle after the worker is
/// consumed by `run()`.
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Non-empty batches read from the buffer
    batches_read: AtomicU64,

    /// Records read from the buffer
    records_read: AtomicU64,

    /// Reads that returned no records before the timeout
    empty_reads: AtomicU64,

    /// Records that survived the processor chain and were published
    records_published: AtomicU64,

    /// Individual sink dispatches that failed
    sink_failures: AtomicU64,

    /// Checkpoints handed back to the buffer
    checkpoints: AtomicU64,
}

impl WorkerMetrics {
    /// Create new metrics with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            batches_read: AtomicU64::new(0),
            records_read: AtomicU64::new(0),
            empty_reads: AtomicU64::new(0),
            records_published: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            checkpoints: AtomicU64::new(0),
        }
    }

    /// Record a non-empty buffer read
    #[inline]
    pub fn record_read(&self, record_count: u64) {
        self.batches_read.fetch_add(1, Ordering::Relaxed);
        self.records_read.fetch_add(record_count, Ordering::Relaxed);
    }

    /// Record an empty buffer read
    #[inline]
    pub fn record_empty_read(&self) {
        self.empty_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a publication attempt
    #[inline]
    pub fn record_published(&self, record_count: u64, failed_sinks: u64) {
        self.records_published
            .fetch_add(record_count, Ordering::Relaxed);
        self.sink_failures.fetch_add(failed_sinks, Ordering::Relaxed);
    }

    /// Record a checkpoint handed back to the buffer
    #[inline]
    pub fn record_checkpoint(&self) {
        self.checkpoints.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> WorkerMetricsSnapshot {
        WorkerMetricsSnapshot {
            batches_read: self.batches_read.load(Ordering::Relaxed),
            records_read: self.records_read.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
            records_published: self.records_published.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            checkpoints: self.checkpoints.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of worker metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerMetricsSnapshot {
    /// Non-empty batches read from the buffer
    pub batches_read: u64,
    /// Records read from the buffer
    pub records_read: u64,
    /// Reads that returned nothing before the timeout
    pub empty_reads: u64,
    /// Records published to sinks
    pub records_published: u64,
    /// Individual sink dispatches that failed
    pub sink_failures: u64,
    /// Checkpoints handed back to the buffer
    pub checkpoints: u64,
}
