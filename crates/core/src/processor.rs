//! Processor contract - one stage in the ordered transformation chain
//!
//! Processors run synchronously inside the worker's iteration: the output
//! of stage *i* is the exclusive input to stage *i+1*. Implementors must be
//! `Send + Sync`; the worker shares the chain read-only for the pipeline's
//! lifetime.

use crate::batch::Batch;
use crate::error::ProcessorError;

/// A transformation stage with lifecycle hooks for shutdown readiness
///
/// # Contract
///
/// - `execute` may drop, transform, split, or enrich records. It must not
///   retain or mutate the input after returning unless that is its
///   documented behavior (stateful processors such as coalescers hold
///   records by design). Errors are fatal to the worker - the hot loop does
///   not catch them.
/// - `prepare_for_shutdown` is invoked exactly once during shutdown; after
///   it, the processor must drain any internally buffered state
///   opportunistically on subsequent `execute` calls.
/// - `is_ready_for_shutdown` is polled repeatedly after the hint and must
///   eventually return true once internal state is drained. A processor
///   that never becomes ready will keep the shutdown loop alive - that is a
///   correctness requirement on the implementation, not the worker.
pub trait Processor: Send + Sync {
    /// Transform a batch, returning the batch seen by the next stage
    ///
    /// Empty batches flow through as well, so stateful processors get a
    /// chance to release held records on otherwise idle iterations.
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError>;

    /// One-time hint that shutdown has begun
    ///
    /// Default implementation does nothing, which suits stateless
    /// processors.
    fn prepare_for_shutdown(&self) {}

    /// Whether all internally held state has been released
    ///
    /// Stateless processors are always ready.
    fn is_ready_for_shutdown(&self) -> bool {
        true
    }

    /// Name of this processor for logging
    fn name(&self) -> &'static str;
}
