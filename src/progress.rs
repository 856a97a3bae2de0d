//! Capture progress and per-job cancellation.
//!
//! A job reports through a [`ProgressCallback`] every
//! [`batch_size`](crate::ExtractOptions::with_batch_size) captured targets,
//! plus one closing report when the job ends. Dropped and unreached targets
//! are not counted.
//!
//! Each [`ExtractOptions`](crate::ExtractOptions) carries its own
//! [`CancellationToken`], so two jobs running side by side never stop each
//! other.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegrab::{
//!     Cadence, CaptureRequest, ExtractOptions, FramegrabError, ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.0}% ({}/{:?})", info.current, info.total);
//!         }
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! let request = CaptureRequest::batch(0.0, 10.0, Cadence::FramesPerSecond(2.0));
//! framegrab::extract("input.mp4", &request, &options)?;
//! # Ok::<(), FramegrabError>(())
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Which backend produced a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Seek-once, decode-forward capture through the FFmpeg libraries.
    NativeExtraction,
    /// One `ffmpeg` process per target.
    CommandExtraction,
}

/// A progress report for one capture job.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Backend running the job.
    pub operation: OperationType,
    /// Targets captured so far.
    pub current: u64,
    /// Targets in the job.
    pub total: Option<u64>,
    /// `current / total` as a percentage, when `total` is non-zero.
    pub percentage: Option<f32>,
    /// Wall-clock time since the job started.
    pub elapsed: Duration,
    /// Linear projection from the capture rate so far.
    pub estimated_remaining: Option<Duration>,
    /// Target time (seconds) of the capture that triggered this report.
    /// `None` on the closing report.
    pub current_timestamp: Option<f64>,
}

impl ProgressInfo {
    /// Whether every target in the job has been captured.
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.current >= total)
    }
}

/// Receives progress reports from a capture job.
///
/// Callbacks observe only; stop a job through its [`CancellationToken`].
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, info: &ProgressInfo);
}

/// Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Shared flag that asks a running job to stop.
///
/// Clones observe the same flag. The native backend checks it before pulling
/// each frame, the command backend before each target. Images already
/// written stay on disk.
///
/// ```
/// use framegrab::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Counts captured targets for one job and emits reports on schedule.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: u64,
    captured: u64,
    every: u64,
    next_report: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: u64,
        every: u64,
    ) -> Self {
        let every = every.max(1);
        Self {
            callback,
            operation,
            total,
            captured: 0,
            every,
            next_report: every,
            started: Instant::now(),
        }
    }

    /// Count one captured target at `timestamp` seconds.
    pub(crate) fn advance(&mut self, timestamp: f64) {
        self.captured += 1;
        if self.captured >= self.next_report {
            self.next_report += self.every;
            self.emit(Some(timestamp));
        }
    }

    /// Closing report, sent whether or not the job finished all targets.
    pub(crate) fn finish(&self) {
        self.emit(None);
    }

    fn emit(&self, current_timestamp: Option<f64>) {
        let elapsed = self.started.elapsed();
        let info = ProgressInfo {
            operation: self.operation,
            current: self.captured,
            total: Some(self.total),
            percentage: percentage(self.captured, self.total),
            elapsed,
            estimated_remaining: remaining_time(elapsed, self.captured, self.total),
            current_timestamp,
        };
        self.callback.on_progress(&info);
    }
}

fn percentage(done: u64, total: u64) -> Option<f32> {
    (total > 0).then(|| done as f32 / total as f32 * 100.0)
}

fn remaining_time(elapsed: Duration, done: u64, total: u64) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    let left = total.saturating_sub(done);
    Some(elapsed.mul_f64(left as f64 / done as f64))
}
