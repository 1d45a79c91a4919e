//! stream/handle.rs
//! Public stream handle and the per-instance submission protocol.
//!
//! Two locks live here and they never nest:
//! - `submission` guards the request queue and the `dispatch_active` flag;
//!   held only for push/pop/flag updates.
//! - `machine` is taken by the single active worker for the duration of one
//!   codec operation; the control thread never touches it.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use bytes::Bytes;
use num_enum::TryFromPrimitive;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::codec::{create_adapter, CodecAdapter, FlushMode};
use crate::config::StreamConfig;
use crate::dispatch::dispatcher::{DispatchShared, Dispatcher};
use crate::dispatch::lifetime::LifetimeToken;
use crate::queue::Queue;
use crate::stream::machine::StreamMachine;
use crate::stream::request::{Callback, Operation, Request};
use crate::stream::state::StreamState;
use crate::telemetry::{AtomicCounters, StageTimes, TelemetrySnapshot};
use crate::types::{Completion, StreamError, SubmitError};

pub(crate) struct Submission {
    pub(crate) queue: Queue<Request>,
    /// A worker is currently draining this stream's queue.
    pub(crate) dispatch_active: bool,
}

pub(crate) struct StreamShared {
    pub(crate) id: u64,
    pub(crate) codec: &'static str,
    pub(crate) machine: Mutex<StreamMachine>,
    pub(crate) submission: Mutex<Submission>,
    pub(crate) counters: AtomicCounters,
    pub(crate) stage_times: Mutex<StageTimes>,
    pub(crate) dispatch: Arc<DispatchShared>,
    state: AtomicU8,
    outstanding: AtomicUsize,
    opened_at: Instant,
    output_limit: Option<usize>,
    max_chunk_size: usize,
}

impl StreamShared {
    pub(crate) fn state(&self) -> StreamState {
        StreamState::try_from_primitive(self.state.load(Ordering::Acquire)).unwrap_or(StreamState::Error)
    }

    /// Mirror of the machine's state, readable without the machine lock.
    pub(crate) fn publish_state(&self, state: StreamState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub(crate) fn retain(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn release(&self) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn pop_request(&self) -> Option<Request> {
        self.submission.lock().pop_request()
    }

    /// Clear `dispatch_active` if the queue is still empty.
    /// Returns false when new work slipped in and the loop must go on.
    pub(crate) fn finish_drain(&self) -> bool {
        let mut submission = self.submission.lock();
        if submission.queue.is_empty() {
            // Leave the loop before the flag drops so the next pass never overlaps.
            self.counters.exit_dispatch_loop();
            submission.dispatch_active = false;
            true
        } else {
            false
        }
    }
}

impl Submission {
    fn pop_request(&mut self) -> Option<Request> {
        self.queue.pop()
    }
}

impl Drop for StreamShared {
    fn drop(&mut self) {
        // Implicit destroy: last handle and last outstanding request are gone.
        let machine = self.machine.get_mut();
        machine.destroy();
        debug!(target: "stream", stream = self.id, "released");
    }
}

/// Handle to one compression/decompression session.
///
/// Every call returns immediately; results arrive through the callback on
/// the dispatcher's control thread, in submission order.
pub struct Stream {
    shared: Arc<StreamShared>,
}

impl Stream {
    /// Open a session with the registry adapter for `config.codec`.
    ///
    /// # Errors
    /// - `StreamError::Init` if the codec cannot be set up.
    pub fn open(dispatcher: &Dispatcher, config: StreamConfig) -> Result<Self, StreamError> {
        let adapter = create_adapter(config.codec, config.level);
        Self::with_adapter(dispatcher, adapter, config)
    }

    /// Open a session around a caller-provided adapter. `config.codec` and
    /// `config.level` are ignored; limits still apply.
    ///
    /// # Errors
    /// - `StreamError::Init` if the config is invalid or the adapter fails to init.
    pub fn with_adapter(
        dispatcher: &Dispatcher,
        adapter: Box<dyn CodecAdapter>,
        config: StreamConfig,
    ) -> Result<Self, StreamError> {
        config
            .validate()
            .map_err(|e| StreamError::init(adapter.name(), e.to_string()))?;

        let mut machine = StreamMachine::new(adapter);
        if let Err(e) = machine.init() {
            warn!(target: "stream", codec = machine.codec_name(), error = %e, "init failed");
            machine.destroy();
            return Err(e);
        }

        let dispatch = dispatcher.shared();
        let id = dispatch.next_stream_id();
        let codec = machine.codec_name();
        let state = machine.state();

        let shared = Arc::new(StreamShared {
            id,
            codec,
            machine: Mutex::new(machine),
            submission: Mutex::new(Submission {
                queue: Queue::with_limit(config.submission_queue_limit),
                dispatch_active: false,
            }),
            counters: AtomicCounters::default(),
            stage_times: Mutex::new(StageTimes::default()),
            dispatch,
            state: AtomicU8::new(state as u8),
            outstanding: AtomicUsize::new(0),
            opened_at: Instant::now(),
            output_limit: config.output_limit,
            max_chunk_size: config.max_chunk_size,
        });

        debug!(target: "stream", stream = id, codec, "opened");
        Ok(Self { shared })
    }

    pub fn write<F>(&self, input: impl Into<Bytes>, callback: F) -> Result<(), SubmitError>
    where
        F: FnOnce(Completion, Bytes) + Send + 'static,
    {
        self.write_flush(input, FlushMode::None, callback)
    }

    /// Write, then flush the codec per `flush` once the input is consumed.
    pub fn write_flush<F>(&self, input: impl Into<Bytes>, flush: FlushMode, callback: F) -> Result<(), SubmitError>
    where
        F: FnOnce(Completion, Bytes) + Send + 'static,
    {
        let op = Operation::Write { input: input.into(), flush };
        self.submit(op, Some(Box::new(callback)))
    }

    /// Finish the codec and release it. The callback receives the trailing output.
    pub fn close<F>(&self, callback: F) -> Result<(), SubmitError>
    where
        F: FnOnce(Completion, Bytes) + Send + 'static,
    {
        self.submit(Operation::Close, Some(Box::new(callback)))
    }

    /// Queue a destroy behind any pending work. No callback.
    pub fn destroy(&self) -> Result<(), SubmitError> {
        self.submit(Operation::Destroy, None)
    }

    /// Queue `op` and make sure a worker is draining this stream.
    ///
    /// # Errors
    /// - `SubmitError::ChunkTooLarge` for oversized write input.
    /// - `SubmitError::OutOfMemory` if the submission queue cannot take the request.
    /// - `SubmitError::DispatcherClosed` after dispatcher shutdown.
    pub fn submit(&self, op: Operation, callback: Option<Callback>) -> Result<(), SubmitError> {
        if let Operation::Write { input, .. } = &op {
            if input.len() > self.shared.max_chunk_size {
                return Err(SubmitError::ChunkTooLarge { have: input.len(), max: self.shared.max_chunk_size });
            }
        }
        if self.shared.dispatch.is_closed() {
            return Err(SubmitError::DispatcherClosed);
        }

        let op_name = op.name();
        let token = LifetimeToken::acquire(&self.shared);
        let request = Request::new(op, callback, self.shared.output_limit, token);

        let pushed = {
            let mut submission = self.shared.submission.lock();
            match submission.queue.push(request) {
                Ok(()) => Ok(std::mem::replace(&mut submission.dispatch_active, true)),
                Err(rejected) => Err(rejected),
            }
        };

        let was_active = match pushed {
            Ok(was_active) => was_active,
            Err(rejected) => {
                warn!(target: "stream", stream = self.shared.id, op = op_name, "submission queue full");
                drop(rejected);
                return Err(SubmitError::OutOfMemory);
            }
        };

        self.shared.counters.record_submitted();
        debug!(target: "stream", stream = self.shared.id, op = op_name, was_active, "queued");

        if !was_active {
            if let Err(e) = self.shared.dispatch.schedule(Arc::clone(&self.shared)) {
                warn!(target: "stream", stream = self.shared.id, error = %e, "no worker to schedule on");
                let orphaned: Vec<Request> = {
                    let mut submission = self.shared.submission.lock();
                    submission.dispatch_active = false;
                    std::iter::from_fn(|| submission.pop_request()).collect()
                };
                drop(orphaned);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn codec(&self) -> &'static str {
        self.shared.codec
    }

    /// Last state published by a worker.
    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    /// Requests queued, in flight, or awaiting callback delivery.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding()
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        let stage_times = self.shared.stage_times.lock().clone();
        TelemetrySnapshot::new(
            self.shared.id,
            self.shared.codec,
            self.state(),
            self.shared.counters.load(),
            stage_times,
            self.shared.opened_at.elapsed(),
        )
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.shared.id)
            .field("codec", &self.shared.codec)
            .field("state", &self.state())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}
