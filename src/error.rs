//! Error types for the `framegrab` crate.
//!
//! This module defines [`FramegrabError`], the unified error type returned by
//! every fallible operation in the crate. Errors carry enough context (file
//! paths, offending values, upstream messages) to be shown to a user as-is,
//! which is exactly what [`extract_with_status`](crate::extract_with_status)
//! does with them.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
///
/// Only whole-job failures surface as a `FramegrabError`. A frame that fails
/// to decode or encode in the middle of a batch is recorded as a
/// [`TargetOutcome::Failed`](crate::TargetOutcome::Failed) instead, and the
/// batch keeps going.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramegrabError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The interval between targets is zero, negative, or not finite.
    #[error("Interval must be a finite number greater than zero (got {0})")]
    InvalidInterval(f64),

    /// A timestamp is negative or not finite.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    /// The requested range produced no target timestamps.
    #[error("Nothing to extract: range {start}s..{end}s yields no timestamps")]
    NothingToExtract {
        /// Range start in seconds.
        start: f64,
        /// Range end in seconds.
        end: f64,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The external `ffmpeg` program could not be run.
    #[error("ffmpeg command failed: {0}")]
    CommandFailed(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FramegrabError {
    fn from(error: FfmpegError) -> Self {
        FramegrabError::FfmpegError(error.to_string())
    }
}
