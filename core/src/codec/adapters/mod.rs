//! codec/adapters/mod.rs
//! Concrete adapters: pass-through, zlib family (flate2), zstd.

pub mod identity;
pub mod deflate;
pub mod zstd;

pub use identity::*;
pub use deflate::*;
pub use self::zstd::*;
