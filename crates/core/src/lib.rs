//! Sluice - Core
//!
//! Data model and collaborator contracts shared by every pipeline component.
//!
//! # Overview
//!
//! The pipeline worker coordinates three kinds of collaborators, each
//! specified here as a trait:
//!
//! - [`Buffer`] - bounded, thread-safe queue the worker reads from and
//!   checkpoints against
//! - [`Processor`] - one transformation stage in an ordered chain, with
//!   lifecycle hooks for graceful shutdown
//! - [`Sink`] - destination for processed batches, dispatched concurrently
//!
//! Data flows as [`Record`]s grouped into [`Batch`]es. Every buffer read
//! produces a [`CheckpointState`] that must be handed back exactly once
//! after the batch has been processed and published.
//!
//! # Architecture
//!
//! ```text
//! [Buffer] ──read──→ [Processor 1] → [Processor 2] → ... ──→ [Sinks]
//!    ↑                                                          │
//!    └──────────────── checkpoint(CheckpointState) ←────────────┘
//! ```

mod batch;
mod buffer;
mod checkpoint;
mod error;
mod processor;
mod record;
mod sink;

pub use batch::Batch;
pub use buffer::{Buffer, ReadFuture};
pub use checkpoint::CheckpointState;
pub use error::{BufferError, ProcessorError, SinkError};
pub use processor::Processor;
pub use record::Record;
pub use sink::{Sink, WriteFuture};
