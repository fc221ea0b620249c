//! Error types for the collaborator contracts
//!
//! Each collaborator has its own error enum. Buffer and processor errors
//! are fatal to the worker loop; sink errors are collected per-publish and
//! never abort an iteration.

use thiserror::Error;

/// Errors reported by a buffer implementation
#[derive(Debug, Error)]
pub enum BufferError {
    /// Read failed for a reason other than an empty buffer
    #[error("buffer read failed: {0}")]
    Read(String),

    /// Write could not complete before the backpressure timeout
    #[error("buffer full: no space for {rejected} records within the write timeout")]
    Timeout {
        /// Records that could not be enqueued
        rejected: usize,
    },

    /// Write asked for more space than the buffer can ever provide
    #[error("write of {requested} records exceeds buffer capacity {capacity}")]
    CapacityExceeded {
        /// Records in the rejected write
        requested: usize,
        /// Total buffer capacity
        capacity: usize,
    },

    /// Checkpoint token does not match any outstanding read
    #[error("unrecognized checkpoint: {claimed} records claimed, {in_flight} in flight")]
    UnknownCheckpoint {
        /// Records the token claims to cover
        claimed: usize,
        /// Records actually awaiting acknowledgment
        in_flight: usize,
    },

    /// Buffer is shut down and no longer accepts operations
    #[error("buffer closed")]
    Closed,
}

impl BufferError {
    /// Create a read error
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }
}

/// Errors reported by a processor stage
///
/// The worker does not catch these in the hot loop: a processor error
/// terminates the whole worker task.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Transformation logic failed
    #[error("processor failed: {0}")]
    Failed(String),

    /// Payload could not be decoded by a payload-aware processor
    #[error("failed to decode record: {0}")]
    Decode(String),

    /// Invalid processor configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProcessorError {
    /// Create a generic failure
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors reported by a sink delivery
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to write data
    #[error("write failed: {0}")]
    Write(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink is shut down and no longer accepts batches
    #[error("sink closed")]
    Closed,
}

impl SinkError {
    /// Create a write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}
