//! dispatch/mod.rs
//! Worker pool, per-stream single-flight draining and the completion bridge
//! back to the control thread.

pub mod dispatcher;
pub mod lifetime;
pub(crate) mod completion;
pub(crate) mod worker;

pub use dispatcher::Dispatcher;
pub use lifetime::KeepAlive;
