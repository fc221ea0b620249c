//! Collect sink - in-memory batch capture
//!
//! Stores every received batch for later inspection. Written for
//! integration tests that need to assert on exactly what was published;
//! also handy as a tap during development.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sluice_core::{Batch, Record, Sink, WriteFuture};

/// Sink that keeps every batch it receives
///
/// Unbounded by design - only use where the batch volume is controlled.
pub struct CollectSink {
    name: String,
    batches: Mutex<Vec<Arc<Batch>>>,
}

impl CollectSink {
    /// Create a collect sink with the default name
    pub fn new() -> Self {
        Self::with_name("collect")
    }

    /// Create a collect sink with a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Number of batches received so far
    pub fn batch_count(&self) -> usize {
        self.lock().len()
    }

    /// Total records across all received batches
    pub fn record_count(&self) -> usize {
        self.lock().iter().map(|b| b.count()).sum()
    }

    /// Clone out the received batches
    pub fn batches(&self) -> Vec<Arc<Batch>> {
        self.lock().clone()
    }

    /// Flatten all received records into one vector
    pub fn records(&self) -> Vec<Record> {
        self.lock()
            .iter()
            .flat_map(|b| b.records().iter().cloned())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Batch>>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CollectSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for CollectSink {
    fn write(&self, batch: Arc<Batch>) -> WriteFuture<'_> {
        Box::pin(async move {
            self.lock().push(batch);
            Ok(())
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
