//! Sluice - Buffer
//!
//! Bounded in-memory buffer connecting sources to the pipeline worker.
//!
//! # Design
//!
//! - **Bounded**: writers wait for space up to a configurable timeout, so a
//!   slow pipeline exerts backpressure on its sources instead of growing
//!   without limit
//! - **Batched reads**: one read drains up to `batch_size` records after the
//!   first arrives, trading per-record overhead for latency
//! - **Checkpointed**: records stay accounted for (in flight) between `read`
//!   and `checkpoint`, so `is_empty` only reports true once everything read
//!   has also been acknowledged
//!
//! # Example
//!
//! ```ignore
//! use sluice_buffer::{BoundedBuffer, BoundedBufferConfig};
//! use sluice_core::{Buffer, Record};
//! use std::time::Duration;
//!
//! let buffer = BoundedBuffer::new(BoundedBufferConfig::default());
//! buffer.write(Record::from("event")).await?;
//!
//! let (batch, checkpoint) = buffer.read(Duration::from_millis(500)).await?;
//! // ... process and publish ...
//! buffer.checkpoint(checkpoint)?;
//! ```

mod bounded;

pub use bounded::{BoundedBuffer, BoundedBufferConfig};
