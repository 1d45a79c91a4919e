//! stream/mod.rs
//! Per-instance state machine, requests and the public handle.
//!
//! Layering:
//! - `state`   : states + commit-on-drop transition guard
//! - `machine` : legal operation sequence around one codec adapter
//! - `request` : one submitted operation and its owned buffers
//! - `handle`  : `Stream`, the submission protocol and single-flight flag

pub mod state;
pub mod machine;
pub mod request;
pub mod handle;

pub use state::{StateTransition, StreamState};
pub use machine::StreamMachine;
pub use request::{Callback, Operation};
pub use handle::Stream;
