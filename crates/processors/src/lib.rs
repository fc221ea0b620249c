//! Sluice - Processors
//!
//! Processor implementations for the pipeline's ordered transformation
//! chain.
//!
//! # Overview
//!
//! Processors implement the [`sluice_core::Processor`] contract: a
//! synchronous `execute` over one batch, plus the shutdown-readiness hooks
//! the worker polls while draining.
//!
//! - [`NoopProcessor`] - pass-through, for testing and benchmarking
//! - [`FilterProcessor`] - keep or drop records on a payload byte match
//! - [`CoalesceProcessor`] - stateful batching stage that holds small
//!   batches until enough records accumulate, releasing everything during
//!   shutdown
//!
//! # Design Principles
//!
//! - **Fast**: execute runs on the worker's hot path; microseconds, not
//!   milliseconds
//! - **Synchronous**: processors never block on I/O
//! - **Thread-safe**: stateful processors guard their state, since the
//!   chain is shared read-only across the pipeline's lifetime

mod coalesce;
mod filter;
mod noop;

pub use coalesce::{CoalesceConfig, CoalesceMetricsSnapshot, CoalesceProcessor};
pub use filter::{FilterAction, FilterConfig, FilterProcessor, MatchMode};
pub use noop::NoopProcessor;
