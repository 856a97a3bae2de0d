//! Lightweight media file probing.
//!
//! [`MediaProbe`] answers "how long is this video and at what rate does it
//! play" without keeping the demuxer open. A front end uses the answer to
//! bound its range controls, so [`MediaProbe::probe_or_fallback`] never fails:
//! an unreadable file or an unknown duration yields
//! [`FALLBACK_DURATION`](crate::metadata::FALLBACK_DURATION), leaving the user
//! free to pick a range end by hand.

use std::{path::Path, time::Duration};

use crate::{
    error::FramegrabError,
    media::MediaFile,
    metadata::{DurationSource, VideoInfo},
};

/// Lightweight media file probe.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaProbe;
///
/// let info = MediaProbe::probe("input.mp4")?;
/// println!("{:?} @ {} fps", info.duration, info.frames_per_second);
/// # Ok::<(), framegrab::FramegrabError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a video file.
    ///
    /// The duration comes from the container header, else from the video
    /// stream, else from the last decodable frame. When all three fail the
    /// result carries [`DurationSource::Fallback`].
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::FileOpen`] if the file cannot be opened and
    /// [`FramegrabError::NoVideoStream`] if it has no video.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoInfo, FramegrabError> {
        let mut media = MediaFile::open(path)?;

        if media.info.duration_source == DurationSource::Fallback {
            match media.last_frame_time() {
                Some(seconds) if seconds > 0.0 => {
                    media.info.duration = Duration::from_secs_f64(seconds);
                    media.info.duration_source = DurationSource::LastFrame;
                }
                _ => log::warn!(
                    "Duration of {} could not be determined, assuming {:?}",
                    media.path().display(),
                    media.info.duration
                ),
            }
        }

        Ok(media.info)
    }

    /// Probe a video file, substituting defaults when it cannot be read.
    ///
    /// Never fails. Unreadable files produce [`VideoInfo::fallback`].
    pub fn probe_or_fallback<P: AsRef<Path>>(path: P) -> VideoInfo {
        let path = path.as_ref();
        match Self::probe(path) {
            Ok(info) => info,
            Err(error) => {
                log::warn!(
                    "Could not probe {}: {error}; using fallback duration",
                    path.display()
                );
                VideoInfo::fallback()
            }
        }
    }
}
