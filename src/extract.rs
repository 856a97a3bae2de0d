//! Capture jobs.
//!
//! A job turns a [`CaptureRequest`] into a target list, creates a fresh
//! session directory, and runs the configured [`Backend`]:
//!
//! - [`Backend::Native`] opens the file once, seeks to just before the first
//!   target, and feeds the forward decode through the sequential
//!   [`matcher`](crate::matcher);
//! - [`Backend::Command`] runs the `ffmpeg` program once per target.
//!
//! Every target ends up with a [`TargetOutcome`]. A frame that fails to
//! convert or encode is recorded as [`TargetOutcome::Failed`] and the job
//! carries on; only failures that make the whole job impossible (no session
//! directory, unopenable container, failed seek) are returned as errors.
//!
//! # Example
//!
//! ```no_run
//! use framegrab::{Cadence, CaptureRequest, ExtractOptions, ImageFormat};
//!
//! let options = ExtractOptions::new().with_image_format(ImageFormat::Jpeg);
//! let request = CaptureRequest::batch(30.0, 40.0, Cadence::FramesPerSecond(24.0));
//!
//! let report = framegrab::extract("input.mp4", &request, &options)?;
//! println!("{}", report.summary());
//! for path in report.saved_paths() {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), framegrab::FramegrabError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{
    configuration::{Backend, ExtractOptions},
    error::FramegrabError,
    matcher::{MatchStatus, MatchWindow, match_frames},
    media::{FrameConverter, MediaFile},
    naming::{SessionKind, create_session_directory, frame_path},
    progress::{OperationType, ProgressTracker},
    timestamps::{Cadence, TargetTimestamps},
};

/// What to capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureMode {
    /// One frame at the playhead position, in seconds.
    Single {
        /// Playhead position in seconds.
        position: f64,
    },
    /// Every `cadence` step from `start` to `end` (inclusive, within
    /// [`TIMESTAMP_EPSILON`](crate::timestamps::TIMESTAMP_EPSILON)).
    Batch {
        /// Range start in seconds.
        start: f64,
        /// Range end in seconds.
        end: f64,
        /// Spacing between targets.
        cadence: Cadence,
    },
}

/// A capture request, validated when the job starts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct CaptureRequest {
    /// The capture mode.
    pub mode: CaptureMode,
}

impl CaptureRequest {
    /// Capture the frame at `position` seconds.
    pub fn single(position: f64) -> Self {
        Self {
            mode: CaptureMode::Single { position },
        }
    }

    /// Capture `start..=end` at the given cadence.
    pub fn batch(start: f64, end: f64, cadence: Cadence) -> Self {
        Self {
            mode: CaptureMode::Batch {
                start,
                end,
                cadence,
            },
        }
    }

    /// Session directory flavour for this request.
    pub fn session_kind(&self) -> SessionKind {
        match self.mode {
            CaptureMode::Single { .. } => SessionKind::Single,
            CaptureMode::Batch { .. } => SessionKind::Batch,
        }
    }

    /// Build the target list, and the effective interval for batches.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidInterval`] or
    /// [`FramegrabError::InvalidTimestamp`] for bad parameters and
    /// [`FramegrabError::NothingToExtract`] when the range is empty.
    pub fn targets(&self) -> Result<(TargetTimestamps, Option<f64>), FramegrabError> {
        match self.mode {
            CaptureMode::Single { position } => Ok((TargetTimestamps::single(position)?, None)),
            CaptureMode::Batch {
                start,
                end,
                cadence,
            } => {
                let interval = cadence.interval()?;
                let targets = TargetTimestamps::range(start, end, interval)?;
                if targets.is_empty() {
                    return Err(FramegrabError::NothingToExtract { start, end });
                }
                Ok((targets, Some(interval)))
            }
        }
    }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The frame was written to this path.
    Saved(PathBuf),
    /// No frame fell inside the target's window before the stream moved on.
    Dropped,
    /// A frame was found but could not be converted, encoded, or written.
    Failed(String),
    /// The job was cancelled before this target was resolved.
    Cancelled,
    /// The video ended before this target was reached.
    Unreached,
}

impl From<MatchStatus<TargetOutcome>> for TargetOutcome {
    fn from(status: MatchStatus<TargetOutcome>) -> Self {
        match status {
            MatchStatus::Matched(outcome) => outcome,
            MatchStatus::Dropped => TargetOutcome::Dropped,
            MatchStatus::Cancelled => TargetOutcome::Cancelled,
            MatchStatus::Unreached => TargetOutcome::Unreached,
        }
    }
}

/// A target timestamp paired with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetResult {
    /// Requested capture instant in seconds.
    pub timestamp: f64,
    /// What happened to it.
    pub outcome: TargetOutcome,
}

/// Result of a capture job.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractionReport {
    /// Directory holding this job's images.
    pub session_directory: PathBuf,
    /// Single snapshot or batch.
    pub kind: SessionKind,
    /// One entry per target, in target order.
    pub targets: Vec<TargetResult>,
    /// Effective interval between targets, for batches.
    pub interval: Option<f64>,
    /// Wall-clock duration of the job.
    pub elapsed: Duration,
    /// Whether the job stopped on its cancellation token.
    pub cancelled: bool,
}

impl ExtractionReport {
    /// Paths of the written images, in target order.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.targets
            .iter()
            .filter_map(|target| match &target.outcome {
                TargetOutcome::Saved(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of written images.
    pub fn saved_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Saved(_)))
    }

    /// Number of targets dropped by the matcher.
    pub fn dropped_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Dropped))
    }

    /// Number of targets whose frame could not be written.
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, TargetOutcome::Failed(_)))
    }

    fn count<F: Fn(&TargetOutcome) -> bool>(&self, predicate: F) -> usize {
        self.targets
            .iter()
            .filter(|target| predicate(&target.outcome))
            .count()
    }

    /// One-line, human-readable status.
    pub fn summary(&self) -> String {
        let mut summary = match self.kind {
            SessionKind::Single => match self.saved_paths().first() {
                Some(path) => format!("Image saved: {}", path.display()),
                None => format!(
                    "No frame captured ({})",
                    self.session_directory.display()
                ),
            },
            SessionKind::Batch => {
                let mut text = format!(
                    "Done: {} image(s) in {:.2}s ({})",
                    self.saved_count(),
                    self.elapsed.as_secs_f64(),
                    self.session_directory.display()
                );
                if let Some(interval) = self.interval {
                    text.push_str(&format!(", interval {interval:.4}s"));
                }
                text
            }
        };

        if self.cancelled {
            summary.push_str(" [cancelled]");
        }
        summary
    }
}

/// Run a capture job.
///
/// # Errors
///
/// Returns an error when the request is invalid or empty, when the session
/// directory cannot be created, or when the source cannot be opened, decoded,
/// or seeked at all. Per-frame problems are reported in the returned
/// [`ExtractionReport`] instead.
pub fn extract<P: AsRef<Path>>(
    path: P,
    request: &CaptureRequest,
    options: &ExtractOptions,
) -> Result<ExtractionReport, FramegrabError> {
    let path = path.as_ref();
    let started = Instant::now();
    let (targets, interval) = request.targets()?;
    let kind = request.session_kind();

    log::debug!(
        "Capturing {} target(s) from {} via {:?}",
        targets.len(),
        path.display(),
        options.backend()
    );

    let (session_directory, outcomes) = match options.backend() {
        Backend::Native => {
            let mut media = MediaFile::open(path)?;
            let session_directory = create_session_directory(options.output_root(), kind)?;
            let window = match interval {
                Some(interval) => MatchWindow::centered(interval),
                None => MatchWindow::at_or_after(),
            };
            let outcomes =
                extract_native(&mut media, &targets, window, &session_directory, options)?;
            (session_directory, outcomes)
        }
        Backend::Command { program } => {
            if !path.is_file() {
                return Err(FramegrabError::FileOpen {
                    path: path.to_path_buf(),
                    reason: "no such file".to_string(),
                });
            }
            let session_directory = create_session_directory(options.output_root(), kind)?;
            let outcomes = crate::command::extract_with_program(
                program,
                path,
                &targets,
                &session_directory,
                options,
            );
            (session_directory, outcomes)
        }
    };

    let cancelled = outcomes
        .iter()
        .any(|outcome| *outcome == TargetOutcome::Cancelled);

    let report = ExtractionReport {
        session_directory,
        kind,
        targets: targets
            .as_slice()
            .iter()
            .zip(outcomes)
            .map(|(&timestamp, outcome)| TargetResult { timestamp, outcome })
            .collect(),
        interval,
        elapsed: started.elapsed(),
        cancelled,
    };

    log::info!("{}", report.summary());
    Ok(report)
}

/// Run a capture job and flatten the result into a status line and the
/// written paths.
///
/// On failure the status line is the error text and the path list is empty.
pub fn extract_with_status<P: AsRef<Path>>(
    path: P,
    request: &CaptureRequest,
    options: &ExtractOptions,
) -> (String, Vec<PathBuf>) {
    match extract(path, request, options) {
        Ok(report) => (report.summary(), report.saved_paths()),
        Err(error) => (format!("Error: {error}"), Vec::new()),
    }
}

/// Seek once, decode forward, and write every matched frame.
fn extract_native(
    media: &mut MediaFile,
    targets: &TargetTimestamps,
    window: MatchWindow,
    session_directory: &Path,
    options: &ExtractOptions,
) -> Result<Vec<TargetOutcome>, FramegrabError> {
    let first = targets.first().unwrap_or_default();
    let image_format = options.image_format();

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::NativeExtraction,
        targets.len() as u64,
        options.batch_size,
    );
    let mut converter = FrameConverter::new();

    let frames = media.decode_from(window.start(first).max(0.0))?;
    let summary = match_frames(
        targets.as_slice(),
        window,
        frames,
        options.cancellation(),
        |index, target, frame| {
            let output_path = frame_path(session_directory, target, image_format);
            let written = converter
                .to_image(&frame)
                .and_then(|image| image_format.write(&image, &output_path));
            tracker.advance(target);

            match written {
                Ok(()) => {
                    log::debug!(
                        "Target {index} ({target:.3}s) <- frame at {:.3}s: {}",
                        frame.presentation_time(),
                        output_path.display()
                    );
                    TargetOutcome::Saved(output_path)
                }
                Err(error) => {
                    log::warn!("Skipping target {target:.3}s: {error}");
                    TargetOutcome::Failed(error.to_string())
                }
            }
        },
    );
    tracker.finish();

    log::debug!(
        "Matched {} of {} target(s); {} frame(s) decoded, {} before window, {} undecodable",
        summary.matched(),
        targets.len(),
        summary.frames_seen,
        summary.frames_discarded,
        summary.frames_failed,
    );

    Ok(summary
        .statuses
        .into_iter()
        .map(TargetOutcome::from)
        .collect())
}
