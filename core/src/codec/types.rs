//! codec/types.rs
//! Codec kinds, flush modes and the adapter trait.
use std::fmt;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::buffer::OutputBuffer;
use crate::codec::constants::codec_ids;
use crate::types::{Status, StreamError};

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    Identity       = codec_ids::IDENTITY,
    Deflate        = codec_ids::DEFLATE,
    Inflate        = codec_ids::INFLATE,
    DeflateRaw     = codec_ids::DEFLATE_RAW,
    InflateRaw     = codec_ids::INFLATE_RAW,
    ZstdCompress   = codec_ids::ZSTD_COMPRESS,
    ZstdDecompress = codec_ids::ZSTD_DECOMPRESS,
}

impl CodecKind {
    pub fn id(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::codec::registry::resolve(*self).name)
    }
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Flush requested after a write's input has been consumed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushMode {
    #[default]
    None,
    /// Emit everything buffered so far, aligned to a byte boundary.
    Sync,
    /// Like `Sync`, and reset compressor state so later output is independent.
    Full,
}

/// Stateful transform driven by a stream's state machine.
///
/// Contract:
/// - `write` consumes a prefix of `input` (advancing the slice) and appends
///   output within `out`'s spare capacity; called repeatedly until the input is
///   empty or it returns `Status::EndOfStream`.
/// - `finish` is called repeatedly, with fresh capacity each time, until it
///   returns `Status::EndOfStream`.
/// - `flush` is called again with more capacity while it leaves `out` full.
/// - `destroy` releases resources and must be idempotent.
// Require Send so trait objects can move to worker threads.
pub trait CodecAdapter: Send {
    fn name(&self) -> &'static str;

    fn init(&mut self) -> Result<(), StreamError>;

    fn write(&mut self, input: &mut &[u8], out: &mut OutputBuffer) -> Result<Status, StreamError>;

    fn flush(&mut self, _mode: FlushMode, _out: &mut OutputBuffer) -> Result<(), StreamError> {
        Ok(())
    }

    fn finish(&mut self, out: &mut OutputBuffer) -> Result<Status, StreamError>;

    fn destroy(&mut self);
}
