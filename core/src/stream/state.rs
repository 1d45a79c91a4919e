//! stream/state.rs
//! Stream states and the guarded transition used around codec work.

use std::fmt;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum StreamState {
    /// Constructed, codec not initialized yet.
    Idle      = 0,
    /// Accepting writes.
    Data      = 1,
    /// Codec reached end-of-stream; no further writes.
    Eos       = 2,
    /// A fatal codec or resource error occurred.
    Error     = 3,
    /// Terminal; codec resources released.
    Destroyed = 4,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamState::Idle      => "idle",
            StreamState::Data      => "data",
            StreamState::Eos       => "eos",
            StreamState::Error     => "error",
            StreamState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Scoped transition: on drop, writes the pending target into the state
/// unless `abort` was called.
///
/// Work that may fail starts with `begin(state, StreamState::Error)`, moves the
/// target with `alter` once the outcome is known, and calls `abort` to keep the
/// current state on plain success. Early returns and unwinding both land on
/// the pending target.
pub struct StateTransition<'a> {
    state: &'a mut StreamState,
    target: Option<StreamState>,
}

impl<'a> StateTransition<'a> {
    pub fn begin(state: &'a mut StreamState, pending: StreamState) -> Self {
        Self { state, target: Some(pending) }
    }

    pub fn alter(&mut self, target: StreamState) {
        self.target = Some(target);
    }

    /// Leave the state untouched.
    pub fn abort(mut self) {
        self.target = None;
    }

    /// State before the transition commits.
    pub fn current(&self) -> StreamState {
        *self.state
    }

    pub fn target(&self) -> Option<StreamState> {
        self.target
    }
}

impl Drop for StateTransition<'_> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            *self.state = target;
        }
    }
}
