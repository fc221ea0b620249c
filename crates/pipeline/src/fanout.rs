//! Sink fan-out - concurrent dispatch of one batch to every sink
//!
//! One task per sink, all spawned before any is awaited, then joined in
//! registration order. The join has no timeout: publication of a batch is
//! allowed to take as long as the slowest sink takes, and the worker will
//! not read the next batch until every dispatch has resolved.
//!
//! Failures (including a panicked dispatch task) are collected into the
//! [`PublishResult`], never propagated - no dispatch is silently abandoned.

use std::sync::Arc;

use sluice_core::{Batch, Sink, SinkError};

/// Outcome of one failed sink dispatch
#[derive(Debug)]
pub struct SinkFailure {
    /// Name of the sink that failed
    pub sink: String,

    /// What went wrong
    pub error: SinkError,
}

/// Aggregate outcome of publishing one batch to all sinks
///
/// Exists only for the duration of one publish call; the worker logs it
/// and moves on to checkpointing regardless of its contents.
#[derive(Debug, Default)]
pub struct PublishResult {
    sink_count: usize,
    failures: Vec<SinkFailure>,
}

impl PublishResult {
    /// Number of sinks the batch was dispatched to
    #[inline]
    pub fn sink_count(&self) -> usize {
        self.sink_count
    }

    /// Number of sinks that failed
    #[inline]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// True iff every sink accepted the batch
    #[inline]
    pub fn is_fully_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// The collected failures
    #[inline]
    pub fn failures(&self) -> &[SinkFailure] {
        &self.failures
    }
}

/// Dispatch `batch` to every sink concurrently and wait for all of them
pub(crate) async fn publish_to_all(sinks: &[Arc<dyn Sink>], batch: Arc<Batch>) -> PublishResult {
    // Spawn everything first so sinks run concurrently, then join in order.
    let mut dispatches = Vec::with_capacity(sinks.len());
    for sink in sinks {
        let sink = Arc::clone(sink);
        let batch = Arc::clone(&batch);
        let name = sink.name().to_string();
        let handle = tokio::spawn(async move { sink.write(batch).await });
        dispatches.push((name, handle));
    }

    let mut result = PublishResult {
        sink_count: sinks.len(),
        failures: Vec::new(),
    };

    for (name, handle) in dispatches {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                result.failures.push(SinkFailure { sink: name, error });
            }
            Err(join_error) => {
                // A panicked dispatch still counts as a failed sink.
                result.failures.push(SinkFailure {
                    sink: name,
                    error: SinkError::write(format!("dispatch task failed: {join_error}")),
                });
            }
        }
    }

    result
}

#[cfg(test)]
#[path = "fanout_test.rs"]
mod tests;
