//! Process-wide run counters.
//!
//! The sequencer bumps these as turns resolve; binaries call
//! [`Metrics::flush`] once before exiting to log the totals.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub static METRICS: Metrics = Metrics::new();

#[derive(Debug, Default)]
pub struct Metrics {
    runs_started: AtomicU64,
    turns_completed: AtomicU64,
    reply_failures: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub turns_completed: u64,
    pub reply_failures: u64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            turns_completed: AtomicU64::new(0),
            reply_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_turns_completed(&self) {
        self.turns_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reply_failures(&self) {
        self.reply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            turns_completed: self.turns_completed.load(Ordering::Relaxed),
            reply_failures: self.reply_failures.load(Ordering::Relaxed),
        }
    }

    /// Log the current totals as one `info!` event and return them.
    pub fn flush(&self) -> MetricsSnapshot {
        let snapshot = self.snapshot();
        tracing::info!(
            event = "metrics.flush",
            runs_started = snapshot.runs_started,
            turns_completed = snapshot.turns_completed,
            reply_failures = snapshot.reply_failures,
        );
        snapshot
    }
}
