//! codec/mod.rs
//! Codec Adapter boundary: the stateful transform a stream drives from its worker.
//!
//! Notes:
//! - Adapters are `Send` but never shared; the dispatcher guarantees one caller at a time.
//! - Adapters append only into the spare capacity the state machine reserved.
//! - Registry resolves codec kinds to implementations.

pub mod constants;
pub mod types;
pub mod registry;
pub mod adapters;

pub use constants::*;
pub use types::*;
pub use registry::*;
