//! stream/machine.rs
//! Legal operation sequence around one codec adapter:
//! open -> write* -> close -> destroyed.
//!
//! Not synchronized; the dispatcher guarantees a single caller at a time.

use crate::buffer::OutputBuffer;
use crate::codec::{CodecAdapter, FlushMode};
use crate::constants::{FINISH_GROWTH_STEP, WRITE_GROWTH_SLACK};
use crate::stream::state::{StateTransition, StreamState};
use crate::types::{Completion, Status, StreamError};

pub struct StreamMachine {
    state: StreamState,
    adapter: Box<dyn CodecAdapter>,
}

impl StreamMachine {
    pub fn new(adapter: Box<dyn CodecAdapter>) -> Self {
        Self { state: StreamState::Idle, adapter }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn codec_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Idle -> Data on success, Idle -> Error otherwise.
    pub fn init(&mut self) -> Result<(), StreamError> {
        if self.state != StreamState::Idle {
            return Err(StreamError::Sequence { op: "init", state: self.state });
        }
        let Self { state, adapter } = self;
        let mut t = StateTransition::begin(state, StreamState::Error);
        adapter.init()?;
        t.alter(StreamState::Data);
        Ok(())
    }

    /// Feed one chunk through the codec, growing `out` as needed.
    ///
    /// Stays in `Data` when all input is consumed, moves to `Eos` when the
    /// codec signals end-of-stream, and lands in `Error` on any failure.
    pub fn write(&mut self, input: &[u8], flush: FlushMode, out: &mut OutputBuffer) -> Completion {
        if self.state != StreamState::Data {
            return Err(StreamError::Sequence { op: "write", state: self.state });
        }
        let Self { state, adapter } = self;
        let mut t = StateTransition::begin(state, StreamState::Error);

        let mut remaining = input;
        while !remaining.is_empty() {
            out.grow_by(remaining.len() + WRITE_GROWTH_SLACK)?;

            if adapter.write(&mut remaining, out)?.is_end_of_stream() {
                t.alter(StreamState::Eos);
                return Ok(Status::EndOfStream);
            }
        }

        if flush != FlushMode::None {
            loop {
                out.grow_by(FINISH_GROWTH_STEP)?;
                adapter.flush(flush, out)?;
                // A full buffer means the codec may still hold flushed bytes.
                if out.spare_capacity() > 0 {
                    break;
                }
            }
        }

        t.abort();
        Ok(Status::Ok)
    }

    /// Drain the codec to end-of-stream without releasing it.
    /// Data -> Eos on success, Data -> Error otherwise.
    pub fn finish(&mut self, out: &mut OutputBuffer) -> Completion {
        if self.state != StreamState::Data {
            return Err(StreamError::Sequence { op: "finish", state: self.state });
        }
        let Self { state, adapter } = self;
        let mut t = StateTransition::begin(state, StreamState::Error);
        let status = drain_finish(adapter.as_mut(), out)?;
        t.alter(StreamState::Eos);
        Ok(status)
    }

    /// Finish (if still in `Data`) and destroy. Always ends `Destroyed`;
    /// returns the finish outcome.
    pub fn close(&mut self, out: &mut OutputBuffer) -> Completion {
        if matches!(self.state, StreamState::Idle | StreamState::Destroyed) {
            return Ok(Status::Ok);
        }

        let result = {
            let Self { state, adapter } = self;
            let t = StateTransition::begin(state, StreamState::Error);
            let result = if t.current() == StreamState::Data {
                drain_finish(adapter.as_mut(), out)
            } else {
                Ok(Status::Ok)
            };
            t.abort();
            result
        };

        self.destroy();
        result
    }

    /// Force `Error` after the adapter unwound mid-operation.
    pub(crate) fn mark_failed(&mut self) {
        if self.state != StreamState::Destroyed {
            self.state = StreamState::Error;
        }
    }

    /// Release codec resources. Idempotent.
    pub fn destroy(&mut self) {
        if !matches!(self.state, StreamState::Idle | StreamState::Destroyed) {
            self.adapter.destroy();
        }
        self.state = StreamState::Destroyed;
    }
}

/// Drive `finish` in fixed growth steps until the codec reports end-of-stream.
fn drain_finish(adapter: &mut dyn CodecAdapter, out: &mut OutputBuffer) -> Completion {
    loop {
        out.grow_by(FINISH_GROWTH_STEP)?;
        if adapter.finish(out)?.is_end_of_stream() {
            return Ok(Status::Ok);
        }
    }
}
