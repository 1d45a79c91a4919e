//! zlib-family adapters via flate2's low-level `Compress`/`Decompress`.
//!
//! Both append straight into the request's output `Vec` with the `*_vec`
//! calls, which never grow the vector: capacity is the state machine's job.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress};

use crate::buffer::OutputBuffer;
use crate::codec::types::{CodecAdapter, FlushMode};
use crate::constants::codec_codes;
use crate::types::{Status, StreamError};

fn not_ready(codec: &'static str) -> StreamError {
    StreamError::codec(codec, codec_codes::NOT_READY, "adapter not initialized")
}

fn map_status(status: flate2::Status) -> Status {
    match status {
        flate2::Status::StreamEnd => Status::EndOfStream,
        flate2::Status::Ok | flate2::Status::BufError => Status::Ok,
    }
}

pub struct DeflateAdapter {
    level: i32,
    zlib_header: bool,
    inner: Option<Compress>,
}

impl DeflateAdapter {
    /// zlib-wrapped deflate stream.
    pub fn zlib(level: i32) -> Self {
        Self { level, zlib_header: true, inner: None }
    }

    /// Headerless deflate stream.
    pub fn raw(level: i32) -> Self {
        Self { level, zlib_header: false, inner: None }
    }
}

impl CodecAdapter for DeflateAdapter {
    fn name(&self) -> &'static str {
        if self.zlib_header { "deflate" } else { "deflate-raw" }
    }

    fn init(&mut self) -> Result<(), StreamError> {
        if !(0..=9).contains(&self.level) {
            return Err(StreamError::init(self.name(), format!("invalid level {}", self.level)));
        }
        self.inner = Some(Compress::new(Compression::new(self.level as u32), self.zlib_header));
        Ok(())
    }

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let codec = self.name();
        let c = self.inner.as_mut().ok_or_else(|| not_ready(codec))?;
        let data: &[u8] = *input;

        let before_in = c.total_in();
        let status = c
            .compress_vec(data, out.as_mut_vec(), FlushCompress::None)
            .map_err(|e| StreamError::codec(codec, codec_codes::STREAM_ERROR, e.to_string()))?;

        let consumed = (c.total_in() - before_in) as usize;
        *input = &data[consumed..];
        Ok(map_status(status))
    }

    fn flush(&mut self, mode: FlushMode, out: &mut OutputBuffer) -> Result<(), StreamError> {
        let codec = self.name();
        let c = self.inner.as_mut().ok_or_else(|| not_ready(codec))?;
        let flush = match mode {
            FlushMode::None => return Ok(()),
            FlushMode::Sync => FlushCompress::Sync,
            FlushMode::Full => FlushCompress::Full,
        };
        c.compress_vec(&[], out.as_mut_vec(), flush)
            .map_err(|e| StreamError::codec(codec, codec_codes::STREAM_ERROR, e.to_string()))?;
        Ok(())
    }

    fn finish(&mut self, out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let codec = self.name();
        let c = self.inner.as_mut().ok_or_else(|| not_ready(codec))?;

        let before_out = c.total_out();
        let status = c
            .compress_vec(&[], out.as_mut_vec(), FlushCompress::Finish)
            .map_err(|e| StreamError::codec(codec, codec_codes::STREAM_ERROR, e.to_string()))?;

        if status != flate2::Status::StreamEnd && c.total_out() == before_out {
            return Err(StreamError::codec(codec, codec_codes::BUF_ERROR, "finish made no progress"));
        }
        Ok(map_status(status))
    }

    fn destroy(&mut self) {
        self.inner = None;
    }
}

pub struct InflateAdapter {
    zlib_header: bool,
    inner: Option<Decompress>,
}

impl InflateAdapter {
    pub fn zlib() -> Self {
        Self { zlib_header: true, inner: None }
    }

    pub fn raw() -> Self {
        Self { zlib_header: false, inner: None }
    }
}

impl CodecAdapter for InflateAdapter {
    fn name(&self) -> &'static str {
        if self.zlib_header { "inflate" } else { "inflate-raw" }
    }

    fn init(&mut self) -> Result<(), StreamError> {
        self.inner = Some(Decompress::new(self.zlib_header));
        Ok(())
    }

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let codec = self.name();
        let d = self.inner.as_mut().ok_or_else(|| not_ready(codec))?;
        let data: &[u8] = *input;

        let (before_in, before_out) = (d.total_in(), d.total_out());
        let status = d
            .decompress_vec(data, out.as_mut_vec(), FlushDecompress::None)
            .map_err(|e| StreamError::codec(codec, codec_codes::DATA_ERROR, e.to_string()))?;

        let consumed = (d.total_in() - before_in) as usize;
        let produced = d.total_out() - before_out;
        *input = &data[consumed..];

        if status != flate2::Status::StreamEnd && consumed == 0 && produced == 0 {
            return Err(StreamError::codec(codec, codec_codes::BUF_ERROR, "write made no progress"));
        }
        Ok(map_status(status))
    }

    fn finish(&mut self, out: &mut OutputBuffer) -> Result<Status, StreamError> {
        let codec = self.name();
        let d = self.inner.as_mut().ok_or_else(|| not_ready(codec))?;

        let before_out = d.total_out();
        let status = d
            .decompress_vec(&[], out.as_mut_vec(), FlushDecompress::Finish)
            .map_err(|e| StreamError::codec(codec, codec_codes::DATA_ERROR, e.to_string()))?;

        if status != flate2::Status::StreamEnd && d.total_out() == before_out {
            return Err(StreamError::codec(codec, codec_codes::BUF_ERROR, "unexpected end of stream"));
        }
        Ok(map_status(status))
    }

    fn destroy(&mut self) {
        self.inner = None;
    }
}
