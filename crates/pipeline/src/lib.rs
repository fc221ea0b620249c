//! Sluice - Pipeline
//!
//! The execution core: a long-running worker that pulls record batches
//! from a buffer, pushes them through an ordered processor chain, fans the
//! survivors out to every sink concurrently, and checkpoints the buffer so
//! it can discard consumed data.
//!
//! # Architecture
//!
//! ```text
//! [Buffer] ──read──→ [Processor 1] → [Processor 2] ──→ fan-out ──→ [Sink A]
//!    ↑                                                    │    └──→ [Sink B]
//!    └───────────── checkpoint (after publish) ←──────────┘
//! ```
//!
//! # Key Design
//!
//! - **One sequential task per pipeline**: no pipelining between successive
//!   batches; a batch is fully processed and published before the next read.
//!   That is what makes one-checkpoint-per-read semantics correct.
//! - **Arc fan-out**: batches are wrapped in `Arc` and dispatched to every
//!   sink concurrently; the worker joins all dispatches before
//!   checkpointing.
//! - **Collected sink failures**: a failing sink is recorded in the publish
//!   result and logged, but never blocks checkpointing.
//! - **Five-phase graceful shutdown**: running → drain buffer → drain grace
//!   period → prepare processors → drain until processors ready. Each
//!   guarantee (no loss of buffered data, bounded wait for late peers,
//!   stateful processor flush) gets its own bounded phase.
//! - **Cooperative stop**: shutdown is signaled through a
//!   `CancellationToken` observed at iteration boundaries, never by
//!   pre-empting an in-flight read or publish.
//!
//! # Example
//!
//! ```ignore
//! use sluice_pipeline::{Pipeline, PipelineWorker};
//! use std::sync::Arc;
//!
//! let pipeline = Arc::new(
//!     Pipeline::builder("telemetry")
//!         .with_sink(Arc::new(sluice_sinks::NullSink::new()))
//!         .build(),
//! );
//!
//! let worker = PipelineWorker::new(buffer, processors, Arc::clone(&pipeline));
//! let handle = tokio::spawn(worker.run());
//!
//! // ... later ...
//! pipeline.request_stop();
//! handle.await??;
//! ```

mod error;
mod fanout;
mod metrics;
mod pipeline;
mod worker;

pub use error::{WorkerError, WorkerResult};
pub use fanout::{PublishResult, SinkFailure};
pub use metrics::{WorkerMetrics, WorkerMetricsSnapshot};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use worker::PipelineWorker;

// Re-export the contract types workers are built from, for convenience
pub use sluice_core::{Batch, Buffer, CheckpointState, Processor, Record, Sink};
