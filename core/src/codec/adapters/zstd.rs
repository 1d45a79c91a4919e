//! src/codec/adapters/zstd.rs
//!
//! Zstd streaming adapters over the raw `Operation` API.
//!
//! Design notes:
//! - Output goes into the request buffer's spare capacity through `fill_spare`.
//! - One frame per stream: `finish` ends the frame, the decoder reports
//!   end-of-stream once a whole frame has been decoded and flushed.
use zstd::stream::raw::{Decoder, Encoder, Operation, OutBuffer};

use crate::buffer::OutputBuffer;
use crate::codec::types::{CodecAdapter, FlushMode};
use crate::constants::codec_codes;
use crate::types::{Status, StreamError};

fn not_ready(codec: &'static str) -> StreamError {
    StreamError::codec(codec, codec_codes::NOT_READY, "adapter not initialized")
}

fn io_error(codec: &'static str, code: i32) -> impl Fn(std::io::Error) -> StreamError {
    move |e| StreamError::codec(codec, code, e.to_string())
}

pub struct ZstdCompressAdapter {
    level: i32,
    inner: Option<Encoder<'static>>,
}

impl ZstdCompressAdapter {
    pub fn new(level: i32) -> Self {
        Self { level, inner: None }
    }
}

impl CodecAdapter for ZstdCompressAdapter {
    fn name(&self) -> &'static str {
        "zstd"
    }

    /// # Errors
    /// - `StreamError::Init` if the level is out of range or the context cannot be created.
    fn init(&mut self) -> Result<(), StreamError> {
        if !zstd::compression_level_range().contains(&self.level) {
            return Err(StreamError::init("zstd", format!("invalid level {}", self.level)));
        }
        let encoder = Encoder::new(self.level).map_err(|e| StreamError::init("zstd", e.to_string()))?;
        self.inner = Some(encoder);
        Ok(())
    }

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let enc = self.inner.as_mut().ok_or_else(|| not_ready("zstd"))?;
        let data: &[u8] = *input;

        let read = out
            .fill_spare(|spare| {
                enc.run_on_buffers(data, spare).map(|s| (s.bytes_written, s.bytes_read))
            })
            .map_err(io_error("zstd", codec_codes::STREAM_ERROR))?;

        *input = &data[read..];
        Ok(Status::Ok)
    }

    fn flush(&mut self, mode: FlushMode, out: &mut OutputBuffer) -> Result<(), StreamError> {
        if mode == FlushMode::None {
            return Ok(());
        }
        let enc = self.inner.as_mut().ok_or_else(|| not_ready("zstd"))?;
        out.fill_spare(|spare| {
            let mut ob = OutBuffer::around(spare);
            let remaining = enc.flush(&mut ob)?;
            Ok::<_, std::io::Error>((ob.pos(), remaining))
        })
        .map_err(io_error("zstd", codec_codes::STREAM_ERROR))?;
        Ok(())
    }

    fn finish(&mut self, out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let enc = self.inner.as_mut().ok_or_else(|| not_ready("zstd"))?;
        let remaining = out
            .fill_spare(|spare| {
                let mut ob = OutBuffer::around(spare);
                let remaining = enc.finish(&mut ob, true)?;
                Ok::<_, std::io::Error>((ob.pos(), remaining))
            })
            .map_err(io_error("zstd", codec_codes::STREAM_ERROR))?;

        Ok(if remaining == 0 { Status::EndOfStream } else { Status::Ok })
    }

    fn destroy(&mut self) {
        self.inner = None;
    }
}

pub struct ZstdDecompressAdapter {
    inner: Option<Decoder<'static>>,
}

impl ZstdDecompressAdapter {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Default for ZstdDecompressAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecAdapter for ZstdDecompressAdapter {
    fn name(&self) -> &'static str {
        "unzstd"
    }

    fn init(&mut self) -> Result<(), StreamError> {
        let decoder = Decoder::new().map_err(|e| StreamError::init("unzstd", e.to_string()))?;
        self.inner = Some(decoder);
        Ok(())
    }

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let dec = self.inner.as_mut().ok_or_else(|| not_ready("unzstd"))?;
        let data: &[u8] = *input;

        let status = out
            .fill_spare(|spare| dec.run_on_buffers(data, spare).map(|s| (s.bytes_written, s)))
            .map_err(io_error("unzstd", codec_codes::DATA_ERROR))?;

        *input = &data[status.bytes_read..];
        if status.remaining == 0 {
            return Ok(Status::EndOfStream);
        }
        if status.bytes_read == 0 && status.bytes_written == 0 {
            return Err(StreamError::codec("unzstd", codec_codes::BUF_ERROR, "write made no progress"));
        }
        Ok(Status::Ok)
    }

    fn finish(&mut self, out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let dec = self.inner.as_mut().ok_or_else(|| not_ready("unzstd"))?;
        let status = out
            .fill_spare(|spare| dec.run_on_buffers(&[], spare).map(|s| (s.bytes_written, s)))
            .map_err(io_error("unzstd", codec_codes::DATA_ERROR))?;

        if status.remaining == 0 {
            return Ok(Status::EndOfStream);
        }
        if status.bytes_written == 0 {
            return Err(StreamError::codec("unzstd", codec_codes::BUF_ERROR, "truncated frame"));
        }
        Ok(Status::Ok)
    }

    fn destroy(&mut self) {
        self.inner = None;
    }
}
