//! telemetry/snapshot.rs
//! Immutable view of one stream's counters and timings.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::stream::StreamState;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::StageTimes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub stream_id: u64,
    pub codec: String,
    pub state: StreamState,
    pub counters: TelemetryCounters,
    /// `bytes_out / bytes_in`; 0.0 before any input.
    pub ratio: f64,
    pub throughput_in_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn new(
        stream_id: u64,
        codec: &str,
        state: StreamState,
        counters: TelemetryCounters,
        stage_times: StageTimes,
        elapsed: Duration,
    ) -> Self {
        let ratio = if counters.bytes_in > 0 {
            counters.bytes_out as f64 / counters.bytes_in as f64
        } else {
            0.0
        };
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            stream_id,
            codec: codec.to_string(),
            state,
            counters,
            ratio,
            throughput_in_bytes_per_sec: throughput,
            elapsed,
            stage_times,
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
