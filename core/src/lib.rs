//! codec-stream-core
//!
//! Asynchronous, order-preserving streaming codec pipeline.
//! Callers submit write/close/destroy requests against a stream; a worker
//! pool runs the codec off the caller's thread and completions come back
//! through the dispatcher on the control thread, in submission order.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod buffer;
pub mod queue;

// Codec adapters and registry
pub mod codec;

// Stream layers
pub mod stream;
pub mod dispatch;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::buffer::OutputBuffer;
    pub use crate::codec::{CodecAdapter, CodecKind, FlushMode};
    pub use crate::config::{DispatcherConfig, StreamConfig};
    pub use crate::dispatch::Dispatcher;
    pub use crate::stream::{Operation, Stream, StreamState};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{Completion, DispatchError, Status, StreamError, SubmitError};
}
