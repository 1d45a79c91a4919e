//! Pass-through adapter: output equals input, end-of-stream on first finish.

use crate::buffer::OutputBuffer;
use crate::codec::types::CodecAdapter;
use crate::constants::codec_codes;
use crate::types::{Status, StreamError};

#[derive(Debug, Default)]
pub struct IdentityAdapter {
    ready: bool,
}

impl IdentityAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_ready(&self) -> Result<(), StreamError> {
        if self.ready {
            Ok(())
        } else {
            Err(StreamError::codec("identity", codec_codes::NOT_READY, "adapter not initialized"))
        }
    }
}

impl CodecAdapter for IdentityAdapter {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn init(&mut self) -> Result<(), StreamError> {
        self.ready = true;
        Ok(())
    }

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError> {
        self.ensure_ready()?;
        let data: &[u8] = *input;
        let copied = out.fill_spare(|spare| {
            let n = spare.len().min(data.len());
            spare[..n].copy_from_slice(&data[..n]);
            Ok::<_, StreamError>((n, n))
        })?;
        *input = &data[copied..];
        Ok(Status::Ok)
    }

    fn finish(&mut self, _out: &mut OutputBuffer) -> Result<Status, StreamError> {
        self.ensure_ready()?;
        Ok(Status::EndOfStream)
    }

    fn destroy(&mut self) {
        self.ready = false;
    }
}
