//! codec/registry.rs
//! Codec registry and factory functions.

use crate::codec::adapters::{deflate, identity, zstd};
use crate::codec::constants::{DEFAULT_LEVEL_DEFLATE, DEFAULT_LEVEL_ZSTD};
use crate::codec::types::{CodecAdapter, CodecKind};

pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: Option<i32>,
    pub compresses: bool,
}

pub fn resolve(kind: CodecKind) -> CodecInfo {
    match kind {
        CodecKind::Identity =>
            CodecInfo { name: "identity", default_level: None, compresses: false },
        CodecKind::Deflate =>
            CodecInfo { name: "deflate", default_level: Some(DEFAULT_LEVEL_DEFLATE), compresses: true },
        CodecKind::Inflate =>
            CodecInfo { name: "inflate", default_level: None, compresses: false },
        CodecKind::DeflateRaw =>
            CodecInfo { name: "deflate-raw", default_level: Some(DEFAULT_LEVEL_DEFLATE), compresses: true },
        CodecKind::InflateRaw =>
            CodecInfo { name: "inflate-raw", default_level: None, compresses: false },
        CodecKind::ZstdCompress =>
            CodecInfo { name: "zstd", default_level: Some(DEFAULT_LEVEL_ZSTD), compresses: true },
        CodecKind::ZstdDecompress =>
            CodecInfo { name: "unzstd", default_level: None, compresses: false },
    }
}

/// Build an uninitialized adapter. Level validation happens in `init`.
pub fn create_adapter(kind: CodecKind, level: Option<i32>) -> Box<dyn CodecAdapter> {
    let level = level.or(resolve(kind).default_level).unwrap_or_default();
    match kind {
        CodecKind::Identity       => Box::new(identity::IdentityAdapter::new()),
        CodecKind::Deflate        => Box::new(deflate::DeflateAdapter::zlib(level)),
        CodecKind::DeflateRaw     => Box::new(deflate::DeflateAdapter::raw(level)),
        CodecKind::Inflate        => Box::new(deflate::InflateAdapter::zlib()),
        CodecKind::InflateRaw     => Box::new(deflate::InflateAdapter::raw()),
        CodecKind::ZstdCompress   => Box::new(zstd::ZstdCompressAdapter::new(level)),
        CodecKind::ZstdDecompress => Box::new(zstd::ZstdDecompressAdapter::new()),
    }
}
