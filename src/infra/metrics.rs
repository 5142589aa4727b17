//! Lock-free run counters and periodic reporting
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are statistical
//! counters only; do NOT use them for coordination or logic decisions.

use crate::io::StopReason;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counters shared by a factory and every processor it creates
#[derive(Debug, Default)]
pub struct Metrics {
    runs: AtomicU64,
    runs_failed: AtomicU64,
    lines_read: AtomicU64,
    events_accepted: AtomicU64,
    events_excluded: AtomicU64,
    picks_emitted: AtomicU64,
    pickers_emitted: AtomicU64,
    stopped_count_limit: AtomicU64,
    stopped_deadline: AtomicU64,
    stopped_end_of_input: AtomicU64,
    decode_failures: AtomicU64,
    io_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lines_read(&self, lines: usize, stop_reason: StopReason) {
        self.lines_read.fetch_add(lines as u64, Ordering::Relaxed);
        let counter = match stop_reason {
            StopReason::CountLimit => &self.stopped_count_limit,
            StopReason::Deadline => &self.stopped_deadline,
            StopReason::EndOfInput => &self.stopped_end_of_input,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_completed(&self, accepted: usize, excluded: usize, pickers: usize, picks: usize) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.events_accepted.fetch_add(accepted as u64, Ordering::Relaxed);
        self.events_excluded.fetch_add(excluded as u64, Ordering::Relaxed);
        self.pickers_emitted.fetch_add(pickers as u64, Ordering::Relaxed);
        self.picks_emitted.fetch_add(picks as u64, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_failure(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        self.io_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters (no reset)
    pub fn report(&self) -> MetricsSummary {
        MetricsSummary {
            runs: self.runs.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            lines_read: self.lines_read.load(Ordering::Relaxed),
            events_accepted: self.events_accepted.load(Ordering::Relaxed),
            events_excluded: self.events_excluded.load(Ordering::Relaxed),
            picks_emitted: self.picks_emitted.load(Ordering::Relaxed),
            pickers_emitted: self.pickers_emitted.load(Ordering::Relaxed),
            stopped_count_limit: self.stopped_count_limit.load(Ordering::Relaxed),
            stopped_deadline: self.stopped_deadline.load(Ordering::Relaxed),
            stopped_end_of_input: self.stopped_end_of_input.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            io_failures: self.io_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSummary {
    pub runs: u64,
    pub runs_failed: u64,
    pub lines_read: u64,
    pub events_accepted: u64,
    pub events_excluded: u64,
    pub picks_emitted: u64,
    pub pickers_emitted: u64,
    pub stopped_count_limit: u64,
    pub stopped_deadline: u64,
    pub stopped_end_of_input: u64,
    pub decode_failures: u64,
    pub io_failures: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            runs = %self.runs,
            runs_failed = %self.runs_failed,
            lines_read = %self.lines_read,
            events_accepted = %self.events_accepted,
            events_excluded = %self.events_excluded,
            pickers = %self.pickers_emitted,
            picks = %self.picks_emitted,
            deadline_hits = %self.stopped_deadline,
            count_limit_hits = %self.stopped_count_limit,
            decode_failures = %self.decode_failures,
            io_failures = %self.io_failures,
            "metrics"
        );
    }
}
