//! Sink contract - destination for processed batches
//!
//! Sinks receive `Arc<Batch>` so multi-sink fan-out shares one batch
//! allocation. Each sink must be independently safe for concurrent
//! single-batch dispatch; no shared mutable state exists between sinks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::batch::Batch;
use crate::error::SinkError;

/// Boxed future returned by [`Sink::write`]
pub type WriteFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Destination for one batch of processed records
///
/// Delivery mechanics (retries, batching, network protocols) are the sink's
/// own concern. The pipeline only requires that `write` eventually resolves
/// - the fan-out waits for every sink before the worker checkpoints.
pub trait Sink: Send + Sync {
    /// Deliver one batch
    ///
    /// A returned error is recorded in the publish result for the batch; it
    /// does not stop the pipeline.
    fn write(&self, batch: Arc<Batch>) -> WriteFuture<'_>;

    /// Name of this sink for failure accounting and logs
    fn name(&self) -> &str;
}
