/// Stable codec IDs (u16) for config and host bindings.
pub mod codec_ids {
    pub const IDENTITY: u16        = 0x0000;
    pub const DEFLATE: u16         = 0x0001;
    pub const INFLATE: u16         = 0x0002;
    pub const DEFLATE_RAW: u16     = 0x0003;
    pub const INFLATE_RAW: u16     = 0x0004;
    pub const ZSTD_COMPRESS: u16   = 0x0005;
    pub const ZSTD_DECOMPRESS: u16 = 0x0006;
}

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_DEFLATE: i32 = 6;
pub const DEFAULT_LEVEL_ZSTD: i32 = 3;
