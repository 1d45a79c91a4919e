//! dispatch/dispatcher.rs
//! Owner of the worker pool and the control-thread side of the completion
//! bridge.
//!
//! The thread that calls `poll`/`wait`/`run_until_idle` is the control
//! thread; every completion callback runs there, in per-stream submission
//! order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::{DispatcherConfig, StreamConfig};
use crate::constants::IDLE_RECHECK_INTERVAL;
use crate::dispatch::completion::CompletionBridge;
use crate::dispatch::lifetime::KeepAlive;
use crate::dispatch::worker::{run_dispatch_loop, spawn_workers, WorkerMessage};
use crate::stream::handle::{Stream, StreamShared};
use crate::types::{DispatchError, StreamError, SubmitError};

pub(crate) struct DispatchShared {
    tasks: Sender<WorkerMessage>,
    pub(crate) completions: CompletionBridge,
    pub(crate) keep_alive: KeepAlive,
    closed: AtomicBool,
    next_stream_id: AtomicU64,
}

impl DispatchShared {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn next_stream_id(&self) -> u64 {
        self.next_stream_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Hand a stream to the pool. Callers must have just flipped its
    /// `dispatch_active` flag from false to true.
    pub(crate) fn schedule(&self, stream: Arc<StreamShared>) -> Result<(), SubmitError> {
        if self.is_closed() {
            return Err(SubmitError::DispatcherClosed);
        }
        self.tasks
            .send(WorkerMessage::Dispatch(stream))
            .map_err(|_| SubmitError::DispatcherClosed)
    }
}

pub struct Dispatcher {
    shared: Arc<DispatchShared>,
    notify_rx: Receiver<()>,
    tasks_rx: Receiver<WorkerMessage>,
    workers: Vec<JoinHandle<()>>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Validate `config` and start the worker threads.
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatchError> {
        config.validate()?;

        let (tasks_tx, tasks_rx) = unbounded();
        let (notify_tx, notify_rx) = bounded(1);

        let shared = Arc::new(DispatchShared {
            tasks: tasks_tx,
            completions: CompletionBridge::new(config.completion_queue_limit, notify_tx),
            keep_alive: KeepAlive::default(),
            closed: AtomicBool::new(false),
            next_stream_id: AtomicU64::new(1),
        });

        let workers = spawn_workers(config.worker_threads, &tasks_rx)?;
        info!(
            target: "dispatch",
            workers = config.worker_threads,
            completion_queue_limit = ?config.completion_queue_limit,
            "dispatcher started"
        );

        Ok(Self { shared, notify_rx, tasks_rx, workers, config })
    }

    pub(crate) fn shared(&self) -> Arc<DispatchShared> {
        Arc::clone(&self.shared)
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn open_stream(&self, config: StreamConfig) -> Result<Stream, StreamError> {
        Stream::open(self, config)
    }

    /// Deliver every completed request without blocking.
    /// Returns the number of callbacks run.
    pub fn poll(&self) -> usize {
        let mut delivered = 0;
        while let Some(request) = self.shared.completions.pop() {
            request.deliver();
            delivered += 1;
        }
        delivered
    }

    /// Deliver pending completions, blocking up to `timeout` for the first one.
    pub fn wait(&self, timeout: Duration) -> usize {
        let delivered = self.poll();
        if delivered > 0 {
            return delivered;
        }
        match self.notify_rx.recv_timeout(timeout) {
            Ok(()) => self.poll(),
            Err(_) => 0,
        }
    }

    /// Deliver completions until no request is outstanding on any stream.
    pub fn run_until_idle(&self) -> usize {
        let mut delivered = 0;
        loop {
            delivered += self.poll();
            if self.shared.keep_alive.count() == 0 {
                return delivered;
            }
            // Recheck periodically; a dropped result releases its token without
            // anything left to deliver.
            let _ = self.notify_rx.recv_timeout(IDLE_RECHECK_INTERVAL);
        }
    }

    /// Requests queued, executing, or awaiting delivery across all streams.
    pub fn outstanding(&self) -> usize {
        self.shared.keep_alive.count()
    }

    pub fn pending_completions(&self) -> usize {
        self.shared.completions.len()
    }

    /// Stop accepting work, let workers finish what is queued, join them, and
    /// deliver the remaining completions.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(target: "dispatch", workers = self.workers.len(), "shutting down");

        for _ in 0..self.workers.len() {
            let _ = self.shared.tasks.send(WorkerMessage::Shutdown);
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!(target: "dispatch", "worker thread panicked");
            }
        }

        // Streams scheduled after the shutdown messages were queued.
        while let Ok(msg) = self.tasks_rx.try_recv() {
            if let WorkerMessage::Dispatch(stream) = msg {
                run_dispatch_loop(&stream);
            }
        }

        let delivered = self.poll();
        info!(target: "dispatch", delivered, outstanding = self.outstanding(), "dispatcher stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.workers.len())
            .field("outstanding", &self.outstanding())
            .field("closed", &self.shared.is_closed())
            .finish()
    }
}
