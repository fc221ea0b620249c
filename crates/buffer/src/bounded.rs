//! BoundedBuffer - bounded, thread-safe record queue with checkpointing
//!
//! Queue state lives under one mutex; `tokio::sync::Notify` wakes readers
//! when records arrive and writers when a read frees space. The lock is
//! never held across an await point.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use sluice_core::{Batch, Buffer, BufferError, CheckpointState, ReadFuture, Record};

/// Default maximum queued records
const DEFAULT_CAPACITY: usize = 12_800;

/// Default records drained per read
const DEFAULT_BATCH_SIZE: usize = 256;

/// Default time a writer waits for space before failing
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`BoundedBuffer`]
#[derive(Debug, Clone)]
pub struct BoundedBufferConfig {
    /// Maximum records queued at once
    pub capacity: usize,

    /// Maximum records returned by one read
    pub batch_size: usize,

    /// How long a writer waits for space before giving up
    pub write_timeout: Duration,
}

impl Default for BoundedBufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl BoundedBufferConfig {
    /// Set the queue capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the per-read batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the writer backpressure timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Queue state guarded by the buffer mutex
#[derive(Debug, Default)]
struct Inner {
    /// Records waiting to be read
    queue: VecDeque<Record>,

    /// Records read but not yet checkpointed
    in_flight: usize,
}

/// Bounded, thread-safe queue of records with checkpoint accounting
///
/// Implements the [`Buffer`] contract consumed by the pipeline worker.
/// `is_empty` reports true only when the queue is drained AND every record
/// handed out by `read` has been checkpointed - the shutdown phases depend
/// on that distinction to avoid discarding unacknowledged data.
pub struct BoundedBuffer {
    config: BoundedBufferConfig,
    inner: Mutex<Inner>,

    /// Signals readers that records arrived
    readable: Notify,

    /// Signals writers that a read freed space
    writable: Notify,
}

impl BoundedBuffer {
    /// Create a buffer with the given configuration
    pub fn new(config: BoundedBufferConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
            readable: Notify::new(),
            writable: Notify::new(),
        }
    }

    /// Get the buffer configuration
    #[inline]
    pub fn config(&self) -> &BoundedBufferConfig {
        &self.config
    }

    /// Number of records currently queued (excludes in-flight records)
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of records read but not yet checkpointed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Write one record, waiting for space up to the configured timeout
    pub async fn write(&self, record: Record) -> Result<(), BufferError> {
        self.write_all(vec![record]).await
    }

    /// Write a group of records atomically
    ///
    /// Either all records are enqueued or none are. Waits for enough free
    /// space up to the write timeout; a group larger than the whole buffer
    /// can never fit and fails immediately.
    pub async fn write_all(&self, records: Vec<Record>) -> Result<(), BufferError> {
        let n = records.len();
        if n == 0 {
            return Ok(());
        }
        if n > self.config.capacity {
            return Err(BufferError::CapacityExceeded {
                requested: n,
                capacity: self.config.capacity,
            });
        }

        let deadline = tokio::time::Instant::now() + self.config.write_timeout;
        let mut records = records;

        loop {
            // Arm the notification before checking state so a concurrent
            // read between check and wait cannot be missed.
            let space_freed = self.writable.notified();

            {
                let mut inner = self.lock();
                if self.config.capacity - inner.queue.len() >= n {
                    inner.queue.extend(records.drain(..));
                    drop(inner);
                    self.readable.notify_one();
                    return Ok(());
                }
            }

            if tokio::time::timeout_at(deadline, space_freed).await.is_err() {
                tracing::debug!(rejected = n, "buffer full, write timed out");
                return Err(BufferError::Timeout { rejected: n });
            }
        }
    }

    /// Drain up to `batch_size` records, updating in-flight accounting
    fn try_drain(&self) -> Option<(Batch, CheckpointState)> {
        let mut inner = self.lock();
        if inner.queue.is_empty() {
            return None;
        }

        let n = inner.queue.len().min(self.config.batch_size);
        let records: Vec<Record> = inner.queue.drain(..n).collect();
        inner.in_flight += n;
        drop(inner);

        // A read frees queue space; wake every waiting writer to re-check.
        self.writable.notify_waiters();

        Some((Batch::new(records), CheckpointState::new(n)))
    }

    /// Lock the queue state, recovering from a poisoned mutex
    ///
    /// A writer that panicked mid-push leaves the queue structurally valid,
    /// so continuing with the inner state is safe.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Buffer for BoundedBuffer {
    fn read(&self, timeout: Duration) -> ReadFuture<'_> {
        Box::pin(async move {
            let deadline = tokio::time::Instant::now() + timeout;

            loop {
                let arrived = self.readable.notified();

                if let Some((batch, state)) = self.try_drain() {
                    return Ok((batch, state));
                }

                if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                    // Timed out waiting for the first record: an empty batch
                    // with a zero token, never an error.
                    return Ok((Batch::empty(), CheckpointState::new(0)));
                }
            }
        })
    }

    fn checkpoint(&self, state: CheckpointState) -> Result<(), BufferError> {
        let claimed = state.num_checked_records();
        let mut inner = self.lock();

        if claimed > inner.in_flight {
            return Err(BufferError::UnknownCheckpoint {
                claimed,
                in_flight: inner.in_flight,
            });
        }

        inner.in_flight -= claimed;
        Ok(())
    }

    fn is_empty(&self) -> bool {
        let inner = self.lock();
        inner.queue.is_empty() && inner.in_flight == 0
    }
}

impl std::fmt::Debug for BoundedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.config.capacity)
            .field("queued", &inner.queue.len())
            .field("in_flight", &inner.in_flight)
            .finish()
    }
}

#[cfg(test)]
#[path = "bounded_test.rs"]
mod tests;
