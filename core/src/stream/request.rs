//! stream/request.rs
//! One submitted operation: owned input, owned output, status and callback.
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use bytes::Bytes;
use tracing::warn;

use crate::buffer::OutputBuffer;
use crate::codec::FlushMode;
use crate::dispatch::lifetime::LifetimeToken;
use crate::stream::handle::StreamShared;
use crate::telemetry::Stage;
use crate::types::{Completion, Status};

/// Completion callback: `(status, output_bytes)`, invoked once on the control thread.
pub type Callback = Box<dyn FnOnce(Completion, Bytes) + Send + 'static>;

/// What a request asks the stream to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Input is shared and read-only once submitted.
    Write { input: Bytes, flush: FlushMode },
    Close,
    Destroy,
}

impl Operation {
    pub fn write(input: impl Into<Bytes>) -> Self {
        Operation::Write { input: input.into(), flush: FlushMode::None }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Write { .. } => "write",
            Operation::Close => "close",
            Operation::Destroy => "destroy",
        }
    }
}

pub(crate) struct Request {
    pub(crate) op: Operation,
    pub(crate) output: OutputBuffer,
    pub(crate) result: Completion,
    callback: Option<Callback>,
    // Released exactly once: after delivery, or wherever the request is dropped.
    token: LifetimeToken,
}

impl Request {
    pub(crate) fn new(
        op: Operation,
        callback: Option<Callback>,
        output_limit: Option<usize>,
        token: LifetimeToken,
    ) -> Self {
        Self {
            op,
            output: OutputBuffer::with_limit(output_limit),
            result: Ok(Status::Ok),
            callback,
            token,
        }
    }

    pub(crate) fn stream(&self) -> Option<&Arc<StreamShared>> {
        self.token.stream()
    }

    /// Control thread only: hand status and output to the callback, then
    /// release the lifetime token.
    pub(crate) fn deliver(self) {
        let Request { op, output, result, callback, token } = self;
        let started = Instant::now();

        match callback {
            Some(callback) => callback(result, output.into_bytes()),
            None => {
                if let Err(e) = &result {
                    warn!(target: "completion", op = op.name(), error = %e, "request failed without a callback");
                }
            }
        }

        if let Some(stream) = token.stream() {
            stream.counters.record_delivered();
            stream.stage_times.lock().add(Stage::Deliver, started.elapsed());
        }
        drop(token);
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("op", &self.op.name())
            .field("output_len", &self.output.len())
            .field("result", &self.result)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}
