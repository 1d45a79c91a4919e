//! config.rs
//! Dispatcher and stream configuration (serde, JSON-loadable, validated).

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{enum_name_or_hex, CodecKind};
use crate::constants::{DEFAULT_MAX_CHUNK_SIZE, MAX_CHUNK_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Worker pool and completion bridge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Threads draining stream queues.
    pub worker_threads: usize,
    /// Node budget of the completion queue; `None` means unbounded.
    pub completion_queue_limit: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::dynamic()
    }
}

impl DispatcherConfig {
    pub fn single_threaded() -> Self {
        Self { worker_threads: 1, completion_queue_limit: None }
    }

    /// One worker per core, leaving one core for the control thread.
    pub fn dynamic() -> Self {
        let cores = num_cpus::get();
        Self {
            worker_threads: cores.saturating_sub(1).max(1),
            completion_queue_limit: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("worker_threads must be at least 1".into()));
        }
        Ok(())
    }
}

/// Per-stream codec selection and allocation budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub codec: CodecKind,
    /// Codec level; `None` picks the codec default.
    pub level: Option<i32>,
    /// Largest input chunk accepted by `write`.
    pub max_chunk_size: usize,
    /// Node budget of the submission queue (gentle OOM when exceeded).
    pub submission_queue_limit: Option<usize>,
    /// Allocation budget for each request's output buffer. Checked against
    /// every growth request (remaining input plus slack on write, 128-byte
    /// steps on finish/flush), so output that would fit exactly can still
    /// fail with `MemoryError`.
    pub output_limit: Option<usize>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::Identity,
            level: None,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            submission_queue_limit: None,
            output_limit: None,
        }
    }
}

impl StreamConfig {
    pub fn new(codec: CodecKind) -> Self {
        Self { codec, ..Self::default() }
    }

    /// Resolve a host-supplied numeric codec id.
    pub fn for_codec_id(raw: u16) -> Result<Self, ConfigError> {
        let codec = CodecKind::try_from_primitive(raw)
            .map_err(|_| ConfigError::Invalid(format!("unknown codec {}", enum_name_or_hex::<CodecKind>(raw))))?;
        Ok(Self::new(codec))
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = Some(limit);
        self
    }

    pub fn with_submission_queue_limit(mut self, limit: usize) -> Self {
        self.submission_queue_limit = Some(limit);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_size == 0 || self.max_chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_chunk_size must be in 1..={}, got {}",
                MAX_CHUNK_SIZE, self.max_chunk_size
            )));
        }
        Ok(())
    }
}
