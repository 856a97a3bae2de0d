//! Video metadata types.
//!
//! [`VideoInfo`] is what a front end needs to set up a capture: how long the
//! video is (for range bounds), how it was measured, and the native frame
//! rate (a sensible default for the capture cadence).

use std::time::Duration;

/// Duration assumed when a file cannot be read or reports no duration.
///
/// Large enough that a user-chosen range end is never clipped.
pub const FALLBACK_DURATION: Duration = Duration::from_secs(3 * 60 * 60);

/// Frame rate assumed when a file cannot be read at all.
pub const FALLBACK_FRAMES_PER_SECOND: f64 = 24.0;

/// Where a [`VideoInfo::duration`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    /// The container header.
    Container,
    /// The video stream's own duration field.
    Stream,
    /// The presentation time of the last decodable frame.
    LastFrame,
    /// Nothing usable was found; [`FALLBACK_DURATION`] was substituted.
    Fallback,
}

/// Summary of a video file.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaProbe;
///
/// let info = MediaProbe::probe_or_fallback("input.mp4");
/// println!("{:?} @ {} fps ({:?})", info.duration, info.frames_per_second, info.duration_source);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoInfo {
    /// Total duration, or [`FALLBACK_DURATION`].
    pub duration: Duration,
    /// How `duration` was obtained.
    pub duration_source: DurationSource,
    /// Average frame rate rounded to three decimals, `0.0` if unknown.
    pub frames_per_second: f64,
    /// Frame width in pixels, `0` if unknown.
    pub width: u32,
    /// Frame height in pixels, `0` if unknown.
    pub height: u32,
    /// Codec name (e.g. `"h264"`), empty if unknown.
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`), empty if unknown.
    pub format: String,
}

impl VideoInfo {
    /// The value reported for a file that could not be opened.
    pub fn fallback() -> Self {
        Self {
            duration: FALLBACK_DURATION,
            duration_source: DurationSource::Fallback,
            frames_per_second: FALLBACK_FRAMES_PER_SECOND,
            width: 0,
            height: 0,
            codec: String::new(),
            format: String::new(),
        }
    }

    /// `true` when the duration was actually measured.
    pub fn duration_known(&self) -> bool {
        self.duration_source != DurationSource::Fallback
    }
}
