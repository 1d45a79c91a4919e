//! constants.rs
//! Growth steps, chunk bounds and codec status codes shared across layers.

/// Slack added on top of the remaining input on every write-side growth call.
pub const WRITE_GROWTH_SLACK: usize = 1;

/// Fixed growth step used while draining a codec on finish/flush.
pub const FINISH_GROWTH_STEP: usize = 128;

/// Defaults when Option<T> is None
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024; // 16 MiB
/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Opaque codec status codes passed through `StreamError::Codec`.
/// Values follow zlib's negative return codes so hosts can map them 1:1.
pub mod codec_codes {
    pub const STREAM_ERROR: i32 = -2;
    pub const DATA_ERROR: i32   = -3;
    pub const BUF_ERROR: i32    = -5;
    /// Adapter used before `init` or after `destroy`.
    pub const NOT_READY: i32    = -100;
}

/// How often `run_until_idle` rechecks outstanding work without a wakeup.
pub const IDLE_RECHECK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(10);
