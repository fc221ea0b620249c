//! Pipeline worker tests
//!
//! Exercises the iteration contract (read → process → publish →
//! checkpoint), the five-phase shutdown ordering, and fatal error
//! propagation, using scripted collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;

use sluice_buffer::{BoundedBuffer, BoundedBufferConfig};
use sluice_core::{
    Batch, Buffer, BufferError, CheckpointState, Processor, ProcessorError, Record, ReadFuture,
    Sink, SinkError, WriteFuture,
};
use sluice_sinks::CollectSink;

use crate::error::WorkerError;
use crate::pipeline::Pipeline;
use crate::worker::PipelineWorker;

/// Shared log of interesting calls, for asserting cross-component ordering
type EventLog = Arc<Mutex<Vec<String>>>;

fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn push_event(events: &EventLog, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

fn records(n: usize) -> Vec<Record> {
    (0..n).map(|i| Record::new(vec![i as u8])).collect()
}

// ============================================================================
// Scripted Collaborators
// ============================================================================

/// Buffer that serves a fixed script of reads, then empty batches forever
///
/// `is_empty` reports true once the script is exhausted, which is enough
/// for the shutdown phases (in-flight accounting is covered by the
/// BoundedBuffer tests).
struct ScriptedBuffer {
    reads: Mutex<VecDeque<Vec<Record>>>,
    checkpoints: Mutex<Vec<usize>>,
    events: Option<EventLog>,
    fail_checkpoint: bool,
}

impl ScriptedBuffer {
    fn new(script: Vec<Vec<Record>>) -> Arc<Self> {
        Arc::new(Self {
            reads: Mutex::new(script.into()),
            checkpoints: Mutex::new(Vec::new()),
            events: None,
            fail_checkpoint: false,
        })
    }

    fn with_events(script: Vec<Vec<Record>>, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            reads: Mutex::new(script.into()),
            checkpoints: Mutex::new(Vec::new()),
            events: Some(events),
            fail_checkpoint: false,
        })
    }

    fn failing_checkpoint(script: Vec<Vec<Record>>) -> Arc<Self> {
        Arc::new(Self {
            reads: Mutex::new(script.into()),
            checkpoints: Mutex::new(Vec::new()),
            events: None,
            fail_checkpoint: true,
        })
    }

    fn checkpoints(&self) -> Vec<usize> {
        self.checkpoints.lock().unwrap().clone()
    }
}

impl Buffer for ScriptedBuffer {
    fn read(&self, _timeout: Duration) -> ReadFuture<'_> {
        Box::pin(async move {
            let next = self.reads.lock().unwrap().pop_front();
            let batch_records = next.unwrap_or_default();
            let n = batch_records.len();

            if let Some(events) = &self.events {
                push_event(events, format!("read:{n}"));
            }

            Ok((Batch::new(batch_records), CheckpointState::new(n)))
        })
    }

    fn checkpoint(&self, state: CheckpointState) -> Result<(), BufferError> {
        if self.fail_checkpoint {
            return Err(BufferError::UnknownCheckpoint {
                claimed: state.num_checked_records(),
                in_flight: 0,
            });
        }

        if let Some(events) = &self.events {
            push_event(events, format!("checkpoint:{}", state.num_checked_records()));
        }
        self.checkpoints
            .lock()
            .unwrap()
            .push(state.num_checked_records());
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.reads.lock().unwrap().is_empty()
    }
}

/// Buffer whose reads always fail
struct FailingBuffer;

impl Buffer for FailingBuffer {
    fn read(&self, _timeout: Duration) -> ReadFuture<'_> {
        Box::pin(async { Err(BufferError::read("backing store unavailable")) })
    }

    fn checkpoint(&self, _state: CheckpointState) -> Result<(), BufferError> {
        Ok(())
    }

    fn is_empty(&self) -> bool {
        true
    }
}

/// Processor that appends one marker byte and records every input it sees
struct MarkerProcessor {
    name: &'static str,
    marker: u8,
    inputs: Mutex<Vec<Vec<Vec<u8>>>>,
}

impl MarkerProcessor {
    fn new(name: &'static str, marker: u8) -> Arc<Self> {
        Arc::new(Self {
            name,
            marker,
            inputs: Mutex::new(Vec::new()),
        })
    }

    fn inputs(&self) -> Vec<Vec<Vec<u8>>> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Processor for MarkerProcessor {
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError> {
        if !batch.is_empty() {
            self.inputs.lock().unwrap().push(
                batch
                    .iter()
                    .map(|r| r.payload().as_ref().to_vec())
                    .collect(),
            );
        }

        Ok(batch
            .into_iter()
            .map(|r| {
                let mut payload = r.payload().as_ref().to_vec();
                payload.push(self.marker);
                Record::new(payload)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Processor that consumes every record
struct DropAllProcessor;

impl Processor for DropAllProcessor {
    fn execute(&self, _batch: Batch) -> Result<Batch, ProcessorError> {
        Ok(Batch::empty())
    }

    fn name(&self) -> &'static str {
        "drop_all"
    }
}

/// Processor that fails on any non-empty batch and records lifecycle calls
struct FailingProcessor {
    events: EventLog,
}

impl Processor for FailingProcessor {
    fn execute(&self, _batch: Batch) -> Result<Batch, ProcessorError> {
        Err(ProcessorError::failed("injected processor failure"))
    }

    fn prepare_for_shutdown(&self) {
        push_event(&self.events, "prepare:failing");
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Stateful processor that holds every record until the shutdown hint
struct HoldUntilPrepared {
    held: Mutex<Vec<Record>>,
    prepared: AtomicBool,
    events: EventLog,
}

impl HoldUntilPrepared {
    fn new(events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            held: Mutex::new(Vec::new()),
            prepared: AtomicBool::new(false),
            events,
        })
    }
}

impl Processor for HoldUntilPrepared {
    fn execute(&self, batch: Batch) -> Result<Batch, ProcessorError> {
        let mut held = self.held.lock().unwrap();
        held.extend(batch.into_records());

        if self.prepared.load(Ordering::Acquire) && !held.is_empty() {
            return Ok(Batch::new(std::mem::take(&mut *held)));
        }
        Ok(Batch::empty())
    }

    fn prepare_for_shutdown(&self) {
        push_event(&self.events, "prepare:holding");
        self.prepared.store(true, Ordering::Release);
    }

    fn is_ready_for_shutdown(&self) -> bool {
        self.held.lock().unwrap().is_empty()
    }

    fn name(&self) -> &'static str {
        "holding"
    }
}

/// Sink that always rejects batches
struct FailingSink;

impl Sink for FailingSink {
    fn write(&self, _batch: Arc<Batch>) -> WriteFuture<'_> {
        Box::pin(async { Err(SinkError::write("injected sink failure")) })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Sink that records an event only after a delay, to observe publish/checkpoint order
struct SlowEventSink {
    events: EventLog,
}

impl Sink for SlowEventSink {
    fn write(&self, _batch: Arc<Batch>) -> WriteFuture<'_> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            push_event(&self.events, "published");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "slow_event"
    }
}

/// Pipeline that is already stopped, with zero drain so shutdown phases
/// run back to back and every scripted read happens in the drain phase
fn draining_pipeline(sinks: Vec<Arc<dyn Sink>>) -> Arc<Pipeline> {
    let mut builder = Pipeline::builder("test")
        .with_read_batch_timeout(Duration::from_millis(10))
        .with_drain_timeout(Duration::ZERO);
    for sink in sinks {
        builder = builder.with_sink(sink);
    }
    let pipeline = Arc::new(builder.build());
    pipeline.request_stop();
    pipeline
}

async fn run_worker(worker: PipelineWorker) -> Result<(), WorkerError> {
    timeout(Duration::from_secs(5), worker.run())
        .await
        .expect("worker did not terminate")
}

// ============================================================================
// Iteration Contract
// ============================================================================

#[tokio::test]
async fn test_checkpoint_sequence_matches_read_sizes() {
    // Buffer yields batches of 3, 0, and 5 records on successive reads.
    let buffer = ScriptedBuffer::new(vec![records(3), records(0), records(5)]);
    let sink = Arc::new(CollectSink::new());
    let pipeline = draining_pipeline(vec![Arc::clone(&sink) as _]);

    let processor = MarkerProcessor::new("marker", b'm');
    let worker = PipelineWorker::new(
        Arc::clone(&buffer) as _,
        vec![Arc::clone(&processor) as _],
        pipeline,
    );
    let metrics = worker.metrics_handle();

    run_worker(worker).await.unwrap();

    // One checkpoint per read, in read order, empty read included.
    assert_eq!(buffer.checkpoints(), vec![3, 0, 5]);

    // Processing was attempted between each checkpoint; the empty batch
    // produced no publish call.
    assert_eq!(processor.inputs().len(), 2);
    assert_eq!(sink.batch_count(), 2);
    assert_eq!(sink.batches()[0].count(), 3);
    assert_eq!(sink.batches()[1].count(), 5);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches_read, 2);
    assert_eq!(snapshot.records_read, 8);
    assert_eq!(snapshot.records_published, 8);
    assert_eq!(snapshot.checkpoints, 3);
    assert_eq!(snapshot.empty_reads, 1);
}

#[tokio::test]
async fn test_empty_chain_output_skips_publish() {
    let buffer = ScriptedBuffer::new(vec![records(4)]);
    let sink = Arc::new(CollectSink::new());
    let pipeline = draining_pipeline(vec![Arc::clone(&sink) as _]);

    let worker = PipelineWorker::new(
        Arc::clone(&buffer) as _,
        vec![Arc::new(DropAllProcessor) as _],
        pipeline,
    );
    let metrics = worker.metrics_handle();

    run_worker(worker).await.unwrap();

    // The chain consumed everything: no publish, but the read is still
    // checkpointed.
    assert_eq!(sink.batch_count(), 0);
    assert_eq!(buffer.checkpoints(), vec![4]);
    assert_eq!(metrics.snapshot().records_published, 0);
}

#[tokio::test]
async fn test_chain_order_is_strict() {
    let buffer = ScriptedBuffer::new(vec![vec![Record::from("x")]]);
    let sink = Arc::new(CollectSink::new());
    let pipeline = draining_pipeline(vec![Arc::clone(&sink) as _]);

    let p1 = MarkerProcessor::new("p1", b'1');
    let p2 = MarkerProcessor::new("p2", b'2');
    let p3 = MarkerProcessor::new("p3", b'3');
    let worker = PipelineWorker::new(
        Arc::clone(&buffer) as _,
        vec![
            Arc::clone(&p1) as _,
            Arc::clone(&p2) as _,
            Arc::clone(&p3) as _,
        ],
        pipeline,
    );

    run_worker(worker).await.unwrap();

    // Each stage saw exactly the previous stage's output.
    assert_eq!(p1.inputs(), vec![vec![b"x".to_vec()]]);
    assert_eq!(p2.inputs(), vec![vec![b"x1".to_vec()]]);
    assert_eq!(p3.inputs(), vec![vec![b"x12".to_vec()]]);

    let published = sink.records();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload().as_ref(), b"x123");
}

#[tokio::test]
async fn test_publish_resolves_before_checkpoint() {
    let events = new_event_log();
    let buffer = ScriptedBuffer::with_events(vec![records(2)], Arc::clone(&events));
    let pipeline = draining_pipeline(vec![Arc::new(SlowEventSink {
        events: Arc::clone(&events),
    }) as _]);

    let worker = PipelineWorker::new(Arc::clone(&buffer) as _, Vec::new(), pipeline);
    run_worker(worker).await.unwrap();

    let log = events.lock().unwrap().clone();
    let publish_at = log.iter().position(|e| e == "published").unwrap();
    let checkpoint_at = log.iter().position(|e| e == "checkpoint:2").unwrap();
    assert!(
        publish_at < checkpoint_at,
        "checkpoint must wait for publication: {log:?}"
    );
}

// ============================================================================
// Sink Failure Accounting
// ============================================================================

#[tokio::test]
async fn test_sink_failure_does_not_block_checkpoint() {
    let buffer = ScriptedBuffer::new(vec![records(2)]);
    let healthy = Arc::new(CollectSink::new());
    let pipeline = draining_pipeline(vec![
        Arc::new(FailingSink) as _,
        Arc::clone(&healthy) as _,
    ]);

    let worker = PipelineWorker::new(Arc::clone(&buffer) as _, Vec::new(), pipeline);
    let metrics = worker.metrics_handle();

    run_worker(worker).await.unwrap();

    // Exactly one failure accounted, batch still checkpointed, healthy
    // sink still served.
    assert_eq!(buffer.checkpoints(), vec![2]);
    assert_eq!(metrics.snapshot().sink_failures, 1);
    assert_eq!(healthy.batch_count(), 1);
}

// ============================================================================
// Fatal Errors
// ============================================================================

#[tokio::test]
async fn test_processor_error_terminates_without_checkpoint() {
    let events = new_event_log();
    let buffer = ScriptedBuffer::new(vec![records(1), records(7)]);
    let sink = Arc::new(CollectSink::new());

    // Not stopped: the failure happens in the running phase.
    let pipeline = Arc::new(
        Pipeline::builder("test")
            .with_read_batch_timeout(Duration::from_millis(10))
            .with_sink(Arc::clone(&sink) as _)
            .build(),
    );

    let worker = PipelineWorker::new(
        Arc::clone(&buffer) as _,
        vec![Arc::new(FailingProcessor {
            events: Arc::clone(&events),
        }) as _],
        pipeline,
    );

    let err = run_worker(worker).await.expect_err("processor failed");
    assert!(matches!(
        err,
        WorkerError::Processor { name: "failing", .. }
    ));

    // No checkpoint for the failed batch, nothing published, and the
    // shutdown phases were skipped: prepare_for_shutdown never ran.
    assert!(buffer.checkpoints().is_empty());
    assert_eq!(sink.batch_count(), 0);
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_buffer_read_error_is_fatal() {
    let pipeline = Arc::new(
        Pipeline::builder("test")
            .with_read_batch_timeout(Duration::from_millis(10))
            .build(),
    );
    let worker = PipelineWorker::new(Arc::new(FailingBuffer) as _, Vec::new(), pipeline);

    let err = run_worker(worker).await.expect_err("read failed");
    assert!(matches!(err, WorkerError::Buffer(BufferError::Read(_))));
}

#[tokio::test]
async fn test_checkpoint_error_is_fatal() {
    let buffer = ScriptedBuffer::failing_checkpoint(vec![records(3)]);
    let pipeline = draining_pipeline(Vec::new());

    let worker = PipelineWorker::new(Arc::clone(&buffer) as _, Vec::new(), pipeline);

    let err = run_worker(worker).await.expect_err("checkpoint failed");
    assert!(matches!(
        err,
        WorkerError::Buffer(BufferError::UnknownCheckpoint { .. })
    ));
}

// ============================================================================
// Shutdown Phases
// ============================================================================

#[tokio::test]
async fn test_shutdown_drains_held_processor_state() {
    let events = new_event_log();
    let buffer = ScriptedBuffer::with_events(vec![records(2), records(3)], Arc::clone(&events));
    let sink = Arc::new(CollectSink::new());
    let pipeline = draining_pipeline(vec![Arc::clone(&sink) as _]);

    let holding = HoldUntilPrepared::new(Arc::clone(&events));
    let worker = PipelineWorker::new(
        Arc::clone(&buffer) as _,
        vec![Arc::clone(&holding) as _],
        pipeline,
    );

    run_worker(worker).await.unwrap();

    let log = events.lock().unwrap().clone();

    // The shutdown hint comes only after the post-stop buffer drain: both
    // scripted reads precede it.
    let prepare_at = log.iter().position(|e| e == "prepare:holding").unwrap();
    let last_scripted_read = log
        .iter()
        .rposition(|e| e == "read:2" || e == "read:3")
        .unwrap();
    assert!(
        last_scripted_read < prepare_at,
        "prepare must follow the buffer drain: {log:?}"
    );

    // Everything the processor held was released and published during
    // phase 5, and the loop only terminated once it was all out.
    assert!(holding.is_ready_for_shutdown());
    assert_eq!(sink.batch_count(), 1);
    assert_eq!(sink.batches()[0].count(), 5);

    // Reads during the drain checkpoint as usual; the phase-5 flush rides
    // an empty read.
    assert_eq!(buffer.checkpoints(), vec![2, 3, 0]);
}

#[tokio::test]
async fn test_drain_grace_period_runs_for_configured_window() {
    let buffer = Arc::new(BoundedBuffer::new(
        BoundedBufferConfig::default()
            .with_capacity(16)
            .with_batch_size(16),
    ));

    let drain = Duration::from_millis(100);
    let read_timeout = Duration::from_millis(10);
    let pipeline = Arc::new(
        Pipeline::builder("test")
            .with_read_batch_timeout(read_timeout)
            .with_drain_timeout(drain)
            .build(),
    );
    pipeline.request_stop();

    let worker = PipelineWorker::new(buffer as _, Vec::new(), Arc::clone(&pipeline));

    let start = std::time::Instant::now();
    run_worker(worker).await.unwrap();
    let elapsed = start.elapsed();

    // At least the configured window, at most the window plus a few
    // iterations' worth of slack.
    assert!(
        elapsed >= drain,
        "grace period cut short: {elapsed:?} < {drain:?}"
    );
    assert!(
        elapsed < drain + read_timeout * 10,
        "grace period overran: {elapsed:?}"
    );
}
