//! Progress tracking for simulation batches.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Receiver of batch progress percentages.
pub trait ProgressSink: Send + Sync {
    /// Report completion in percent (0..=100).
    fn report_progress(&self, percent: u8);
}

/// Sink that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn report_progress(&self, _percent: u8) {}
}

/// Progress tracker shared by the workers of one batch.
///
/// After run `i` (zero-based, in completion order) the tracker reports
/// `floor(i * 100 / total)`. Reports are serialized and only forwarded when
/// they exceed the last forwarded value, so the sink observes a strictly
/// increasing sequence even when workers finish out of order.
#[derive(Debug)]
pub struct ProgressTracker {
    total_runs: u64,
    completed_runs: AtomicU64,
    last_reported: Mutex<Option<u8>>,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    #[must_use]
    pub fn new(total_runs: u64) -> Self {
        Self {
            total_runs,
            completed_runs: AtomicU64::new(0),
            last_reported: Mutex::new(None),
            start_time: Instant::now(),
        }
    }

    /// Mark a run as completed and forward progress to `sink`.
    pub fn run_completed(&self, sink: &dyn ProgressSink) {
        let index = self.completed_runs.fetch_add(1, Ordering::Relaxed);
        let percent = if self.total_runs == 0 {
            100
        } else {
            (index.min(self.total_runs) * 100 / self.total_runs) as u8
        };
        self.forward(percent, sink);
    }

    /// Forward the terminal 100% report.
    pub fn finish(&self, sink: &dyn ProgressSink) {
        self.forward(100, sink);
    }

    fn forward(&self, percent: u8, sink: &dyn ProgressSink) {
        let mut last = self
            .last_reported
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if last.is_none_or(|prev| percent > prev) {
            *last = Some(percent);
            sink.report_progress(percent);
        }
    }

    /// Get current progress.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let completed = self.completed_runs.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed();

        let runs_per_sec = if elapsed.as_secs_f64() > 0.0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let remaining = self.total_runs.saturating_sub(completed);
        let eta_secs = if runs_per_sec > 0.0 {
            (remaining as f64 / runs_per_sec) as u64
        } else {
            0
        };

        Progress {
            total: self.total_runs,
            completed,
            elapsed_secs: elapsed.as_secs(),
            eta_secs,
            runs_per_sec,
        }
    }
}

/// Progress snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Total number of runs.
    pub total: u64,
    /// Completed runs.
    pub completed: u64,
    /// Elapsed time in seconds.
    pub elapsed_secs: u64,
    /// Estimated time remaining in seconds.
    pub eta_secs: u64,
    /// Runs processed per second.
    pub runs_per_sec: f64,
}

impl Progress {
    /// Get completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}
