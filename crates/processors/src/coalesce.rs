//! Coalesce Processor - accumulate small batches into larger ones
//!
//! Holds incoming records until at least `min_records` have accumulated,
//! then releases them all as one batch. Downstream sinks see fewer, larger
//! batches.
//!
//! This is the stateful processor that exercises the worker's shutdown
//! protocol: records held here are invisible to the buffer's accounting,
//! so the worker keeps iterating after `prepare_for_shutdown` until this
//! stage reports it has released everything.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sluice_core::{Batch, Processor, ProcessorError, Record};

/// Default records accumulated before a release
const DEFAULT_MIN_RECORDS: usize = 512;

/// Configuration for [`CoalesceProcessor`]
#[derive(Debug, Clone)]
pub struct CoalesceConfig {
    /// Records to accumulate before releasing a batch
    pub min_records: usize,
}

impl Default for CoalesceConfig {
    fn default() -> Self {
        Self {
            min_records: DEFAULT_MIN_RECORDS,
        }
    }
}

impl CoalesceConfig {
    /// Set the accumulation threshold
    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records.max(1);
        self
    }
}

/// Counters for observing coalescing behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalesceMetricsSnapshot {
    /// Records accepted by this stage
    pub records_in: u64,
    /// Records released downstream
    pub records_out: u64,
    /// Release operations performed
    pub releases: u64,
}

/// Stateful processor that batches records across iterations
///
/// `execute` returns an empty batch while accumulating; once the threshold
/// is reached (or shutdown has been signaled) it returns everything held.
pub struct CoalesceProcessor {
    config: CoalesceConfig,

    /// Records held across execute calls
    held: Mutex<Vec<Record>>,

    /// Set once by prepare_for_shutdown; afterwards every execute releases
    preparing: AtomicBool,

    records_in: AtomicU64,
    records_out: AtomicU64,
    releases: AtomicU64,
}

impl CoalesceProcessor {
    /// Create a coalesce processor
    pub fn new(config: CoalesceConfig) -> Self {
        Self {
            config,
            held: Mutex::new(Vec::new()),
            preparing: AtomicBool::new(false),
            records_in: AtomicU64::new(0),
            records_out: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }

    /// Number of records currently held
    pub fn held_count(&self) -> usize {
        self.lock_held().len()
    }

    /// Get a metrics snapshot
    pub fn metrics(&self) -> CoalesceMetricsSnapshot {
        CoalesceMetricsSnapshot {
            records_in: self.records_in.load(Ordering::Relaxed),
            records_out: self.records_out.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
        }
    }

    fn lock_held(&self) -> MutexGuard<'_, Vec<Record>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Processor for CoalesceProcessor {
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError> {
        self.records_in
            .fetch_add(batch.count() as u64, Ordering::Relaxed);

        let mut held = self.lock_held();
        held.extend(batch.into_records());

        let release = !held.is_empty()
            && (self.preparing.load(Ordering::Acquire) || held.len() >= self.config.min_records);

        if !release {
            return Ok(Batch::empty());
        }

        let records = std::mem::take(&mut *held);
        drop(held);

        self.records_out
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        self.releases.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(records = records.len(), "coalesce released batch");

        Ok(Batch::new(records))
    }

    fn prepare_for_shutdown(&self) {
        tracing::debug!(held = self.held_count(), "coalesce preparing for shutdown");
        self.preparing.store(true, Ordering::Release);
    }

    fn is_ready_for_shutdown(&self) -> bool {
        self.lock_held().is_empty()
    }

    fn name(&self) -> &'static str {
        "coalesce"
    }
}

#[cfg(test)]
#[path = "coalesce_test.rs"]
mod tests;
