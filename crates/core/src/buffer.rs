//! Buffer contract - what the worker requires from a buffer
//!
//! The buffer is the only resource shared across pipeline components and
//! must provide its own thread safety for concurrent `read` / `checkpoint` /
//! `is_empty` calls. The worker adds no locking on top of this contract.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::batch::Batch;
use crate::checkpoint::CheckpointState;
use crate::error::BufferError;

/// Boxed future returned by [`Buffer::read`]
pub type ReadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(Batch, CheckpointState), BufferError>> + Send + 'a>>;

/// Bounded, thread-safe queue of records the worker reads from and
/// checkpoints against
///
/// # Contract
///
/// - `read` blocks up to `timeout` waiting for at least one record, then
///   returns whatever is available. On timeout it returns an empty batch
///   with a zero checkpoint. It must never block indefinitely, whatever the
///   timeout value.
/// - `checkpoint` acknowledges the records represented by the token so the
///   buffer may discard them. The worker calls it exactly once per read.
///   A token the buffer cannot recognize is an error, not a no-op.
/// - `is_empty` is a shutdown-phase exit condition, not a mutual-exclusion
///   primitive - it is allowed to race with concurrent writers.
pub trait Buffer: Send + Sync {
    /// Read one batch, waiting up to `timeout` for the first record
    ///
    /// Returns the batch together with the checkpoint token covering it.
    /// An empty batch still carries a (zero) token that must be
    /// checkpointed.
    fn read(&self, timeout: Duration) -> ReadFuture<'_>;

    /// Acknowledge the records represented by `state`
    ///
    /// Fails with [`BufferError::UnknownCheckpoint`] if the token does not
    /// correspond to outstanding reads.
    fn checkpoint(&self, state: CheckpointState) -> Result<(), BufferError>;

    /// True iff no records are currently available or awaiting acknowledgment
    fn is_empty(&self) -> bool;
}
