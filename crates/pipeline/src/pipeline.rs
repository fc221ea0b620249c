//! Pipeline - the enclosing context the worker runs against
//!
//! Owns the sink set, the timeouts, the pipeline identity, and the
//! cooperative stop signal. The worker holds a non-owning `Arc` to it for
//! the duration of its run.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sluice_core::{Batch, Sink};

use crate::fanout::{self, PublishResult};

/// Default time one buffer read waits for the first record
const DEFAULT_READ_BATCH_TIMEOUT: Duration = Duration::from_millis(500);

/// Default best-effort window for late-arriving data during shutdown
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The enclosing context for one pipeline
///
/// Shutdown is a cooperative signal: [`Pipeline::request_stop`] cancels the
/// token and the worker observes it at its next iteration boundary. Nothing
/// pre-empts an in-flight read or publish.
pub struct Pipeline {
    name: String,
    sinks: Vec<Arc<dyn Sink>>,
    read_batch_timeout: Duration,
    drain_timeout: Duration,
    shutdown: CancellationToken,
}

impl Pipeline {
    /// Start building a pipeline with the given name
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder {
            name: name.into(),
            sinks: Vec::new(),
            read_batch_timeout: DEFAULT_READ_BATCH_TIMEOUT,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            shutdown: None,
        }
    }

    /// Pipeline name, used to identify it in logs and errors
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How long one buffer read waits for the first record
    #[inline]
    pub fn read_batch_timeout(&self) -> Duration {
        self.read_batch_timeout
    }

    /// Best-effort window for late-arriving data during shutdown phase 3
    #[inline]
    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    /// Number of configured sinks
    #[inline]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Whether a stop has been signaled
    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Signal the worker to begin graceful shutdown
    ///
    /// Idempotent; observed at the worker's next iteration boundary.
    pub fn request_stop(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(pipeline = %self.name, "stop requested");
            self.shutdown.cancel();
        }
    }

    /// The underlying shutdown token, for wiring into other tasks
    #[inline]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Publish one batch to every sink concurrently
    ///
    /// Resolves only once every dispatch has completed or failed. Per-sink
    /// failures are collected in the result, never raised.
    pub async fn publish_to_sinks(&self, batch: Batch) -> PublishResult {
        fanout::publish_to_all(&self.sinks, Arc::new(batch)).await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("sink_count", &self.sinks.len())
            .field("stop_requested", &self.is_stop_requested())
            .finish()
    }
}

/// Builder for [`Pipeline`]
pub struct PipelineBuilder {
    name: String,
    sinks: Vec<Arc<dyn Sink>>,
    read_batch_timeout: Duration,
    drain_timeout: Duration,
    shutdown: Option<CancellationToken>,
}

impl PipelineBuilder {
    /// Add a sink to the fan-out set
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Set the buffer read timeout
    pub fn with_read_batch_timeout(mut self, timeout: Duration) -> Self {
        self.read_batch_timeout = timeout;
        self
    }

    /// Set the shutdown drain grace period
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Use an externally owned shutdown token
    ///
    /// Lets one token fan a stop signal out to several pipelines. Without
    /// this, the pipeline creates its own token and `request_stop` is the
    /// only way to cancel it.
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            sinks: self.sinks,
            read_batch_timeout: self.read_batch_timeout,
            drain_timeout: self.drain_timeout,
            shutdown: self.shutdown.unwrap_or_default(),
        }
    }
}
