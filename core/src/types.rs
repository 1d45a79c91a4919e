use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::stream::StreamState;

/// Non-error outcome of a codec step or of a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Input consumed (or finish completed) without reaching end-of-stream.
    Ok,
    /// The codec signalled end-of-stream; no further writes are accepted.
    EndOfStream,
}

impl Status {
    pub fn is_end_of_stream(self) -> bool {
        self == Status::EndOfStream
    }
}

/// Unified stream error carried on a request and handed to its callback.
/// - Never crosses a thread boundary as a panic; always a value.
/// - Messages aim to be stable and contextual for telemetry and logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Operation is illegal in the current state (e.g. write after close).
    #[error("sequence error: {op} not allowed in state {state}")]
    Sequence { op: &'static str, state: StreamState },

    /// Output buffer growth failed.
    #[error("insufficient memory: could not grow output by {requested} bytes")]
    Memory { requested: usize },

    /// Codec setup failed.
    #[error("codec {codec} init failed: {msg}")]
    Init { codec: &'static str, msg: String },

    /// Codec-specific transform error, code passed through from the adapter.
    #[error("codec {codec} failed ({code}): {msg}")]
    Codec { codec: &'static str, code: i32, msg: String },

    /// The adapter panicked while running on a worker.
    #[error("codec adapter panicked: {0}")]
    AdapterPanic(String),
}

impl StreamError {
    pub fn codec(codec: &'static str, code: i32, msg: impl Into<String>) -> Self {
        StreamError::Codec { codec, code, msg: msg.into() }
    }

    pub fn init(codec: &'static str, msg: impl Into<String>) -> Self {
        StreamError::Init { codec, msg: msg.into() }
    }
}

/// Errors reported synchronously at the submission call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Gentle out-of-memory: the request could not be queued.
    #[error("insufficient space")]
    OutOfMemory,

    #[error("chunk too large: {have} > {max}")]
    ChunkTooLarge { have: usize, max: usize },

    #[error("dispatcher has shut down")]
    DispatcherClosed,
}

/// Dispatcher startup failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid dispatcher config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// What a callback receives as its status argument.
pub type Completion = Result<Status, StreamError>;
