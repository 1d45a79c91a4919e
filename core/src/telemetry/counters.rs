//! telemetry/counters.rs
//! Request and byte counters for one stream.
//!
//! Workers and the control thread update `AtomicCounters` concurrently;
//! `load()` produces the plain `TelemetryCounters` value used in snapshots.
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub requests_submitted: u64,
    pub requests_executed: u64,
    pub requests_delivered: u64,
    /// Completed requests the completion queue could not take.
    pub deliveries_dropped: u64,
    pub errors: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Worker drain passes; one per scheduling of the stream.
    pub dispatch_loops: u64,
    /// Most drain passes ever seen running at once. Single-flight keeps this at 1.
    pub peak_dispatch_concurrency: u64,
}

impl TelemetryCounters {
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.requests_submitted += other.requests_submitted;
        self.requests_executed += other.requests_executed;
        self.requests_delivered += other.requests_delivered;
        self.deliveries_dropped += other.deliveries_dropped;
        self.errors += other.errors;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.dispatch_loops += other.dispatch_loops;
        self.peak_dispatch_concurrency = self.peak_dispatch_concurrency.max(other.peak_dispatch_concurrency);
    }

    /// Requests submitted but not yet delivered or dropped.
    pub fn in_flight(&self) -> u64 {
        self.requests_submitted
            .saturating_sub(self.requests_delivered + self.deliveries_dropped)
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

#[derive(Default, Debug)]
pub struct AtomicCounters {
    requests_submitted: AtomicU64,
    requests_executed: AtomicU64,
    requests_delivered: AtomicU64,
    deliveries_dropped: AtomicU64,
    errors: AtomicU64,
    bytes_in: AtomicU64,
    bytes_out: AtomicU64,
    dispatch_loops: AtomicU64,
    active_dispatch: AtomicU64,
    peak_dispatch_concurrency: AtomicU64,
}

impl AtomicCounters {
    pub fn record_submitted(&self) {
        self.requests_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// One request run through the codec.
    pub fn record_executed(&self, bytes_in: usize, bytes_out: usize, failed: bool) {
        self.requests_executed.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes_in as u64, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes_out as u64, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_delivered(&self) {
        self.requests_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.deliveries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Drain pass entered; pair with `exit_dispatch_loop`.
    pub fn enter_dispatch_loop(&self) {
        self.dispatch_loops.fetch_add(1, Ordering::Relaxed);
        let now = self.active_dispatch.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_dispatch_concurrency.fetch_max(now, Ordering::AcqRel);
    }

    pub fn exit_dispatch_loop(&self) {
        self.active_dispatch.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn load(&self) -> TelemetryCounters {
        TelemetryCounters {
            requests_submitted: self.requests_submitted.load(Ordering::Relaxed),
            requests_executed: self.requests_executed.load(Ordering::Relaxed),
            requests_delivered: self.requests_delivered.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            dispatch_loops: self.dispatch_loops.load(Ordering::Relaxed),
            peak_dispatch_concurrency: self.peak_dispatch_concurrency.load(Ordering::Acquire),
        }
    }
}
