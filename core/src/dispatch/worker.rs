//! dispatch/worker.rs
//! Worker threads and the per-stream drain loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use crossbeam::channel::Receiver;
use tracing::{debug, error, trace};

use crate::stream::handle::StreamShared;
use crate::stream::request::{Operation, Request};
use crate::telemetry::Stage;
use crate::types::{Status, StreamError};

pub(crate) enum WorkerMessage {
    /// Drain this stream's submission queue.
    Dispatch(Arc<StreamShared>),
    Shutdown,
}

pub(crate) fn spawn_workers(
    count: usize,
    rx: &Receiver<WorkerMessage>,
) -> std::io::Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(count);
    for i in 0..count {
        let rx = rx.clone();
        let handle = thread::Builder::new()
            .name(format!("codec-worker-{i}"))
            .spawn(move || run_dispatch_worker(i, rx))?;
        handles.push(handle);
    }
    Ok(handles)
}

pub(crate) fn run_dispatch_worker(index: usize, rx: Receiver<WorkerMessage>) {
    debug!(target: "dispatch", worker = index, "worker started");
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Dispatch(stream) => run_dispatch_loop(&stream),
            WorkerMessage::Shutdown => break,
        }
    }
    debug!(target: "dispatch", worker = index, "worker exiting");
}

/// Drain `stream` until its queue is observed empty under the submission
/// lock. Only one worker runs this per stream at a time.
pub(crate) fn run_dispatch_loop(stream: &Arc<StreamShared>) {
    stream.counters.enter_dispatch_loop();
    loop {
        while let Some(mut request) = stream.pop_request() {
            execute(stream, &mut request);
            stream.dispatch.completions.push(request);
        }
        if stream.finish_drain() {
            break;
        }
    }
}

fn execute(stream: &StreamShared, request: &mut Request) {
    let started = Instant::now();
    let mut machine = stream.machine.lock();

    let op = &request.op;
    let output = &mut request.output;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match op {
        Operation::Write { input, flush } => (Stage::Write, machine.write(input, *flush, output)),
        Operation::Close => (Stage::Finish, machine.close(output)),
        Operation::Destroy => {
            machine.destroy();
            (Stage::Destroy, Ok(Status::Ok))
        }
    }));

    let (stage, result) = match outcome {
        Ok(done) => done,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!(target: "stream", stream = stream.id, op = op.name(), panic = %msg, "codec adapter panicked");
            machine.mark_failed();
            (stage_of(op), Err(StreamError::AdapterPanic(msg)))
        }
    };

    let state = machine.state();
    drop(machine);
    stream.publish_state(state);

    let bytes_in = match op {
        Operation::Write { input, .. } => input.len(),
        _ => 0,
    };
    stream.counters.record_executed(bytes_in, request.output.len(), result.is_err());
    stream.stage_times.lock().add(stage, started.elapsed());

    trace!(
        target: "stream",
        stream = stream.id,
        op = op.name(),
        bytes_in,
        bytes_out = request.output.len(),
        %state,
        "executed"
    );
    request.result = result;
}

fn stage_of(op: &Operation) -> Stage {
    match op {
        Operation::Write { .. } => Stage::Write,
        Operation::Close => Stage::Finish,
        Operation::Destroy => Stage::Destroy,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
