//! Output file and session directory naming.
//!
//! File names are derived from the *target* timestamp rather than from the
//! presentation time of the frame that satisfied it, so re-running the same
//! request produces the same names. Each job writes into its own session
//! directory stamped with the local wall-clock time of its creation.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local, TimeZone};

use crate::{encode::ImageFormat, error::FramegrabError};

/// Whether a session holds a single snapshot or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// One frame at the playhead position.
    Single,
    /// A range sampled at a fixed cadence.
    Batch,
}

impl SessionKind {
    /// Directory name prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            SessionKind::Single => "single",
            SessionKind::Batch => "batch",
        }
    }
}

/// Format seconds as `H-MM-SS_ffffff`, rounded to the microsecond.
///
/// Hours are not padded and keep counting past 24.
///
/// ```
/// assert_eq!(framegrab::naming::format_timestamp(12.5), "0-00-12_500000");
/// assert_eq!(framegrab::naming::format_timestamp(3723.0), "1-02-03_000000");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let total_micros = (seconds.max(0.0) * 1e6).round() as u64;
    let whole_seconds = total_micros / 1_000_000;
    let hours = whole_seconds / 3600;
    let minutes = (whole_seconds / 60) % 60;
    let secs = whole_seconds % 60;
    let micros = total_micros % 1_000_000;
    format!("{hours}-{minutes:02}-{secs:02}_{micros:06}")
}

/// File stem for a target timestamp, e.g. `frame_0-00-12_500000`.
pub fn frame_stem(target: f64) -> String {
    format!("frame_{}", format_timestamp(target))
}

/// Full path of the image written for `target` inside `session_directory`.
pub fn frame_path(session_directory: &Path, target: f64, format: ImageFormat) -> PathBuf {
    session_directory.join(format!("{}.{}", frame_stem(target), format.extension()))
}

/// Session directory name for a job started at `started_at`.
pub fn session_name<Tz: TimeZone>(kind: SessionKind, started_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}", kind.prefix(), started_at.format("%Y%m%d_%H%M%S"))
}

/// Create a fresh session directory for a job starting now.
///
/// A job never shares its directory: when the stamped name is already taken
/// (another job started within the same second) a `_2`, `_3`, ... suffix is
/// appended until an unused name is found.
///
/// # Errors
///
/// Returns [`FramegrabError::IoError`] if the directory cannot be created.
pub fn create_session_directory(
    output_root: &Path,
    kind: SessionKind,
) -> Result<PathBuf, FramegrabError> {
    fs::create_dir_all(output_root)?;
    let base = session_name(kind, &Local::now());

    let mut attempt = 1_u32;
    loop {
        let name = if attempt == 1 {
            base.clone()
        } else {
            format!("{base}_{attempt}")
        };
        let directory = output_root.join(name);
        match fs::create_dir(&directory) {
            Ok(()) => {
                log::debug!("Session directory: {}", directory.display());
                return Ok(directory);
            }
            Err(error) if error.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(error) => return Err(error.into()),
        }
    }
}
