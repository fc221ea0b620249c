//! Worker error types
//!
//! Anything surfaced here is fatal to the worker task: buffer and processor
//! failures are not retried or contained, they abort the loop including any
//! remaining shutdown phases. Per-sink failures are not errors at this
//! level - they live in [`crate::PublishResult`].

use thiserror::Error;

use sluice_core::{BufferError, ProcessorError};

/// Fatal worker errors
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Buffer read or checkpoint failed
    #[error("buffer operation failed")]
    Buffer(#[from] BufferError),

    /// A processor stage failed
    #[error("processor '{name}' failed")]
    Processor {
        /// Name of the failing stage
        name: &'static str,
        #[source]
        source: ProcessorError,
    },
}

/// Result type for worker operations
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;
