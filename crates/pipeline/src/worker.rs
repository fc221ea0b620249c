//! PipelineWorker - the read → process → publish → checkpoint loop
//!
//! One worker runs as a single long-lived sequential task per pipeline.
//! Every shutdown phase reuses the same iteration (`do_run`) under a
//! different exit condition:
//!
//! 1. **Running** - iterate until a stop is signaled on the pipeline
//! 2. **DrainBuffer** - iterate until the buffer reports empty, flushing
//!    records that were already enqueued when the stop arrived
//! 3. **DrainGracePeriod** - iterate until a wall-clock deadline, a
//!    best-effort window for slow upstream peers still delivering data
//! 4. **PrepareProcessorsShutdown** - hint every processor once, in chain
//!    order; no iterations in this phase
//! 5. **DrainUntilProcessorsReady** - iterate until the buffer is empty and
//!    every processor reports its held state drained
//!
//! A fatal error (buffer or processor) anywhere aborts the remaining
//! phases; it is reported exactly once, identified by pipeline name.

use std::sync::Arc;

use sluice_core::{Buffer, Processor};

use crate::error::{WorkerError, WorkerResult};
use crate::metrics::WorkerMetrics;
use crate::pipeline::Pipeline;

/// The pipeline's execution core
///
/// Consumed by [`PipelineWorker::run`]; take a [`metrics_handle`] first if
/// you want to observe the loop from outside.
///
/// [`metrics_handle`]: PipelineWorker::metrics_handle
pub struct PipelineWorker {
    buffer: Arc<dyn Buffer>,
    processors: Vec<Arc<dyn Processor>>,
    pipeline: Arc<Pipeline>,
    metrics: Arc<WorkerMetrics>,

    /// Suppresses repeated empty-read logging; re-armed by a non-empty read
    empty_read_logged: bool,
}

impl PipelineWorker {
    /// Create a worker over the given buffer, processor chain, and pipeline
    pub fn new(
        buffer: Arc<dyn Buffer>,
        processors: Vec<Arc<dyn Processor>>,
        pipeline: Arc<Pipeline>,
    ) -> Self {
        Self {
            buffer,
            processors,
            pipeline,
            metrics: Arc::new(WorkerMetrics::new()),
            empty_read_logged: false,
        }
    }

    /// Get a metrics handle that stays valid after `run()` consumes the worker
    pub fn metrics_handle(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the worker until graceful shutdown completes or a fatal error
    ///
    /// The error, if any, has already been logged once with the pipeline
    /// name when this returns; it is also handed back so the spawner can
    /// react (e.g. tear down the rest of the pipeline).
    pub async fn run(mut self) -> WorkerResult<()> {
        let name = self.pipeline.name().to_string();

        match self.execute().await {
            Ok(()) => {
                let snapshot = self.metrics.snapshot();
                tracing::info!(
                    pipeline = %name,
                    records_read = snapshot.records_read,
                    records_published = snapshot.records_published,
                    checkpoints = snapshot.checkpoints,
                    "worker terminated after graceful shutdown"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    pipeline = %name,
                    error = %e,
                    "worker terminated with fatal error, skipping remaining shutdown phases"
                );
                Err(e)
            }
        }
    }

    /// Drive all five shutdown phases
    async fn execute(&mut self) -> WorkerResult<()> {
        let name = self.pipeline.name().to_string();

        // Phase 1 - iterate until a stop is signaled.
        while !self.pipeline.is_stop_requested() {
            self.do_run().await?;
        }
        tracing::info!(pipeline = %name, "shutdown phase 1 complete, stop observed");

        // Phase 2 - iterate until the buffer is empty.
        tracing::info!(pipeline = %name, "beginning shutdown phase 2, draining buffer");
        while !self.buffer.is_empty() {
            self.do_run().await?;
        }
        tracing::info!(pipeline = %name, "shutdown phase 2 complete");

        // Phase 3 - iterate until the drain grace period expires, giving
        // slow upstream peers a bounded chance to deliver what they hold.
        let drain_timeout = self.pipeline.drain_timeout();
        let deadline = tokio::time::Instant::now() + drain_timeout;
        tracing::info!(
            pipeline = %name,
            timeout_ms = drain_timeout.as_millis() as u64,
            "beginning shutdown phase 3, drain grace period"
        );
        while tokio::time::Instant::now() < deadline {
            self.do_run().await?;
        }
        tracing::info!(pipeline = %name, "shutdown phase 3 complete");

        // Phase 4 - hint every processor exactly once, in chain order.
        tracing::info!(pipeline = %name, "beginning shutdown phase 4, preparing processors");
        for processor in &self.processors {
            processor.prepare_for_shutdown();
        }
        tracing::info!(pipeline = %name, "shutdown phase 4 complete");

        // Phase 5 - iterate until the buffer is empty and every processor
        // has released its held state.
        tracing::info!(pipeline = %name, "beginning shutdown phase 5, draining processors");
        while !self.components_ready_for_shutdown() {
            self.do_run().await?;
        }
        tracing::info!(pipeline = %name, "shutdown phase 5 complete");

        Ok(())
    }

    /// One iteration: read, process, publish, checkpoint
    async fn do_run(&mut self) -> WorkerResult<()> {
        let (batch, checkpoint_state) = self
            .buffer
            .read(self.pipeline.read_batch_timeout())
            .await?;

        if batch.is_empty() {
            self.metrics.record_empty_read();
            if !self.empty_read_logged {
                tracing::debug!(
                    pipeline = %self.pipeline.name(),
                    "no records received from buffer"
                );
                self.empty_read_logged = true;
            }
        } else {
            self.metrics.record_read(batch.count() as u64);
            self.empty_read_logged = false;
            tracing::debug!(
                pipeline = %self.pipeline.name(),
                records = batch.count(),
                "processing records from buffer"
            );
        }

        // Empty batches flow through the chain too: stateful processors use
        // otherwise idle iterations to release held records.
        let mut batch = batch;
        for processor in &self.processors {
            batch = processor
                .execute(batch)
                .map_err(|source| WorkerError::Processor {
                    name: processor.name(),
                    source,
                })?;
        }

        if !batch.is_empty() {
            let record_count = batch.count() as u64;
            let result = self.pipeline.publish_to_sinks(batch).await;
            self.metrics
                .record_published(record_count, result.failed_count() as u64);

            if !result.is_fully_successful() {
                for failure in result.failures() {
                    tracing::warn!(
                        pipeline = %self.pipeline.name(),
                        sink = %failure.sink,
                        error = %failure.error,
                        "sink failed to accept batch"
                    );
                }
                tracing::warn!(
                    pipeline = %self.pipeline.name(),
                    failed = result.failed_count(),
                    sinks = result.sink_count(),
                    records = record_count,
                    "batch publication had failures, checkpointing anyway"
                );
            }
        }

        // Checkpoint only after publication has fully resolved, whether the
        // batch was empty, became empty in the chain, or partially failed.
        self.buffer.checkpoint(checkpoint_state)?;
        self.metrics.record_checkpoint();

        Ok(())
    }

    /// Shutdown phase 5 exit condition
    fn components_ready_for_shutdown(&self) -> bool {
        self.buffer.is_empty()
            && self
                .processors
                .iter()
                .all(|processor| processor.is_ready_for_shutdown())
    }
}

impl std::fmt::Debug for PipelineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineWorker")
            .field("pipeline", &self.pipeline.name())
            .field("processors", &self.processors.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "worker_test.rs"]
mod tests;
