//! Noop Processor - pass-through stage
//!
//! Passes batches through unchanged. Useful for testing the chain
//! infrastructure and for benchmarking worker overhead.

use sluice_core::{Batch, Processor, ProcessorError};

/// A processor that passes batches through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl NoopProcessor {
    /// Create a new noop processor
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl Processor for NoopProcessor {
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError> {
        Ok(batch)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
