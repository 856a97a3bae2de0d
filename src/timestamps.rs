//! Target timestamp generation.
//!
//! A capture request is turned into a [`TargetTimestamps`] list exactly once,
//! before any decoding starts. The list is strictly increasing and is never
//! modified afterwards; the [`matcher`](crate::matcher) walks it with a
//! forward-only cursor.
//!
//! # Example
//!
//! ```
//! use framegrab::{Cadence, TargetTimestamps};
//!
//! let interval = Cadence::Interval(1.0).interval()?;
//! let targets = TargetTimestamps::range(0.0, 5.0, interval)?;
//! assert_eq!(targets.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
//! # Ok::<(), framegrab::FramegrabError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::FramegrabError;

/// Slack allowed past the range end, absorbing floating-point accumulation.
pub const TIMESTAMP_EPSILON: f64 = 1e-4;

/// Hard cap on the number of generated targets.
pub const MAX_TARGETS: usize = 100_000;

/// Spacing rule for a batch capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// A fixed number of seconds between targets.
    Interval(f64),
    /// A target frame rate; the interval is `1 / fps`.
    FramesPerSecond(f64),
}

impl Cadence {
    /// Pick a cadence from UI-style settings.
    ///
    /// When `use_fps` is set and `fps` is positive the frame rate wins,
    /// otherwise the explicit `interval` is used.
    pub fn from_settings(use_fps: bool, fps: f64, interval: f64) -> Self {
        if use_fps && fps > 0.0 {
            Cadence::FramesPerSecond(fps)
        } else {
            Cadence::Interval(interval)
        }
    }

    /// The effective interval in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidInterval`] if the interval (or frame
    /// rate) is not a finite positive number.
    pub fn interval(&self) -> Result<f64, FramegrabError> {
        let interval = match *self {
            Cadence::Interval(seconds) => seconds,
            Cadence::FramesPerSecond(fps) => {
                if !(fps.is_finite() && fps > 0.0) {
                    return Err(FramegrabError::InvalidInterval(fps));
                }
                1.0 / fps
            }
        };

        if interval.is_finite() && interval > 0.0 {
            Ok(interval)
        } else {
            Err(FramegrabError::InvalidInterval(interval))
        }
    }
}

impl Display for Cadence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Cadence::Interval(seconds) => write!(f, "every {seconds}s"),
            Cadence::FramesPerSecond(fps) => write!(f, "{fps} fps"),
        }
    }
}

/// An ordered, strictly increasing list of capture instants in seconds.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct TargetTimestamps {
    values: Vec<f64>,
}

impl TargetTimestamps {
    /// A single capture point.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidTimestamp`] for negative or non-finite
    /// positions.
    pub fn single(position: f64) -> Result<Self, FramegrabError> {
        validate_timestamp(position)?;
        Ok(Self {
            values: vec![position],
        })
    }

    /// `start, start + interval, start + 2 * interval, ...` up to `end`.
    ///
    /// A value is kept while it does not exceed `end` by more than
    /// [`TIMESTAMP_EPSILON`]. Values are accumulated by repeated addition.
    /// Generation stops after [`MAX_TARGETS`] entries. An `end` before
    /// `start` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidTimestamp`] if `start` is negative or
    /// not finite, or if `end` is not finite, and
    /// [`FramegrabError::InvalidInterval`] if `interval` is not a finite
    /// positive number.
    pub fn range(start: f64, end: f64, interval: f64) -> Result<Self, FramegrabError> {
        validate_timestamp(start)?;
        if !end.is_finite() {
            return Err(FramegrabError::InvalidTimestamp(end));
        }
        if !(interval.is_finite() && interval > 0.0) {
            return Err(FramegrabError::InvalidInterval(interval));
        }

        let mut values = Vec::new();
        let mut current = start;
        while current <= end + TIMESTAMP_EPSILON {
            if values.len() >= MAX_TARGETS {
                log::warn!(
                    "Target list capped at {MAX_TARGETS} entries (range {start}s..{end}s every {interval}s)"
                );
                break;
            }
            values.push(current);
            current += interval;
        }

        log::debug!(
            "Generated {} target(s) from {start}s to {end}s every {interval}s",
            values.len()
        );
        Ok(Self { values })
    }

    /// The timestamps as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when there is nothing to capture.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The earliest target, where the decoder seeks to.
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

fn validate_timestamp(value: f64) -> Result<(), FramegrabError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FramegrabError::InvalidTimestamp(value))
    }
}
