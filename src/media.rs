//! Native media access through the FFmpeg libraries.
//!
//! [`MediaFile`] opens a container, picks its best video stream, and caches a
//! [`VideoInfo`] summary. [`MediaFile::decode_from`] seeks once and hands back
//! a [`DecodedFrames`] iterator that decodes forward lazily; frames are only
//! converted to RGB images when a caller asks for it through
//! [`FrameConverter`], so frames rejected by the matcher cost a decode and
//! nothing more.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    error::FramegrabError,
    matcher::PresentationTime,
    metadata::{DurationSource, FALLBACK_DURATION, VideoInfo},
    utilities::{
        frame_to_buffer, pts_to_seconds, rational_to_f64, seconds_to_seek_timestamp,
    },
};

/// Seek target far past the end of any real file.
const END_SEEK_TIMESTAMP: i64 = 1 << 60;

/// An opened video file.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaFile;
///
/// let mut media = MediaFile::open("input.mp4")?;
/// println!("{:?}", media.info().duration);
///
/// let mut converter = framegrab::FrameConverter::new();
/// for frame in media.decode_from(10.0)?.take(3) {
///     let frame = frame?;
///     let image = converter.to_image(&frame)?;
///     println!("{:.3}s: {}x{}", frame.presentation_time(), image.width(), image.height());
/// }
/// # Ok::<(), framegrab::FramegrabError>(())
/// ```
pub struct MediaFile {
    pub(crate) input_context: Input,
    pub(crate) video_stream_index: usize,
    pub(crate) time_base: Rational,
    pub(crate) info: VideoInfo,
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a media file for frame capture.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, and locates the best
    /// video stream.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::FileOpen`] if the file cannot be opened or
    /// its decoder cannot be configured, and [`FramegrabError::NoVideoStream`]
    /// if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramegrabError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| FramegrabError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramegrabError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramegrabError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| FramegrabError::FileOpen {
                path: file_path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let mut frames_per_second = rational_to_f64(stream.avg_frame_rate());
        if frames_per_second <= 0.0 {
            frames_per_second = rational_to_f64(stream.rate());
        }
        let frames_per_second = (frames_per_second * 1000.0).round() / 1000.0;

        let container_duration = input_context.duration();
        let stream_duration = stream.duration();
        let (duration, duration_source) = if container_duration > 0 {
            (
                Duration::from_micros(container_duration as u64),
                DurationSource::Container,
            )
        } else if stream_duration > 0 {
            (
                Duration::from_secs_f64(pts_to_seconds(stream_duration, time_base)),
                DurationSource::Stream,
            )
        } else {
            (FALLBACK_DURATION, DurationSource::Fallback)
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = VideoInfo {
            duration,
            duration_source,
            frames_per_second,
            width: decoder.width(),
            height: decoder.height(),
            codec,
            format: input_context.format().name().to_string(),
        };

        log::debug!(
            "Opened {}: {:?} ({:?}), {} fps, {}x{}",
            file_path.display(),
            info.duration,
            info.duration_source,
            info.frames_per_second,
            info.width,
            info.height,
        );

        Ok(Self {
            input_context,
            video_stream_index,
            time_base,
            info,
            file_path,
        })
    }

    /// Cached metadata for the video stream.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Seek to at or before `seconds` and decode forward from there.
    ///
    /// The first frames yielded may precede `seconds`; seeking lands on a
    /// keyframe, not on the requested instant.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::FfmpegError`] if the decoder cannot be built
    /// or the seek fails.
    pub fn decode_from(&mut self, seconds: f64) -> Result<DecodedFrames<'_>, FramegrabError> {
        let decoder = self.new_decoder()?;

        let seek_timestamp = seconds_to_seek_timestamp(seconds);
        log::debug!("Seeking to {seconds:.3}s ({seek_timestamp} µs)");
        if let Err(error) = self.input_context.seek(seek_timestamp, ..seek_timestamp) {
            // Some platforms refuse a seek bounded at zero; a fresh demuxer is
            // already at the start.
            if seek_timestamp > 0 {
                return Err(error.into());
            }
            log::debug!("Seek to start refused ({error}), decoding from current position");
        }

        Ok(DecodedFrames {
            input_context: &mut self.input_context,
            decoder,
            video_stream_index: self.video_stream_index,
            time_base: self.time_base,
            pending: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Presentation time of the last decodable frame, found by seeking to
    /// the very end and decoding what remains.
    pub(crate) fn last_frame_time(&mut self) -> Option<f64> {
        let decoder = self.new_decoder().ok()?;
        if let Err(error) = self.input_context.seek(END_SEEK_TIMESTAMP, ..END_SEEK_TIMESTAMP) {
            log::debug!("End seek failed for {}: {error}", self.file_path.display());
            return None;
        }

        let frames = DecodedFrames {
            input_context: &mut self.input_context,
            decoder,
            video_stream_index: self.video_stream_index,
            time_base: self.time_base,
            pending: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        };

        frames
            .filter_map(Result::ok)
            .map(|frame| frame.presentation_time)
            .reduce(f64::max)
    }

    fn new_decoder(&self) -> Result<VideoDecoder, FramegrabError> {
        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(FramegrabError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        Ok(decoder_context.decoder().video()?)
    }
}

/// A decoded, not yet converted, video frame.
pub struct DecodedFrame {
    frame: VideoFrame,
    presentation_time: f64,
}

impl DecodedFrame {
    /// Presentation time in seconds from media start.
    pub fn presentation_time(&self) -> f64 {
        self.presentation_time
    }

    /// Width of the decoded picture.
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    /// Height of the decoded picture.
    pub fn height(&self) -> u32 {
        self.frame.height()
    }
}

impl PresentationTime for DecodedFrame {
    fn presentation_time(&self) -> f64 {
        self.presentation_time
    }
}

impl Debug for DecodedFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DecodedFrame")
            .field("presentation_time", &self.presentation_time)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// A lazy, forward-only stream of decoded frames.
///
/// Created by [`MediaFile::decode_from`]. Decode failures on a packet are
/// yielded as `Err` items and decoding carries on with the next packet.
pub struct DecodedFrames<'a> {
    input_context: &'a mut Input,
    decoder: VideoDecoder,
    video_stream_index: usize,
    time_base: Rational,
    pending: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl Iterator for DecodedFrames<'_> {
    type Item = Result<DecodedFrame, FramegrabError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Drain what the decoder already has before feeding more packets.
            if self.decoder.receive_frame(&mut self.pending).is_ok() {
                let frame = std::mem::replace(&mut self.pending, VideoFrame::empty());
                let Some(pts) = frame.timestamp().or_else(|| frame.pts()) else {
                    log::debug!("Skipping decoded frame without a timestamp");
                    continue;
                };
                return Some(Ok(DecodedFrame {
                    presentation_time: pts_to_seconds(pts, self.time_base),
                    frame,
                }));
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut *self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        if let Err(error) = self.decoder.send_packet(&packet) {
                            return Some(Err(FramegrabError::from(error)));
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(FramegrabError::from(error)));
                    }
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error, try the next packet.
                }
            }
        }
    }
}

/// Converts decoded frames to RGB8 images at their native size.
///
/// The scaler is built from the first frame it sees and rebuilt whenever the
/// source format or dimensions change.
#[derive(Default)]
pub struct FrameConverter {
    scaler: Option<ScalingContext>,
    source: Option<(Pixel, u32, u32)>,
    rgb_frame: Option<VideoFrame>,
}

impl FrameConverter {
    /// Create a converter; nothing is allocated until the first frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a decoded frame to an RGB8 [`DynamicImage`].
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::FfmpegError`] if the scaler fails and
    /// [`FramegrabError::VideoDecodeError`] if the pixel data does not form
    /// a valid image.
    pub fn to_image(&mut self, frame: &DecodedFrame) -> Result<DynamicImage, FramegrabError> {
        let source = (frame.frame.format(), frame.width(), frame.height());
        let (_, width, height) = source;

        if self.source != Some(source) || self.scaler.is_none() {
            self.scaler = Some(ScalingContext::get(
                source.0,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
            self.source = Some(source);
            // The scaler only fills an empty output frame at the new size.
            self.rgb_frame = None;
        }

        let rgb_frame = self.rgb_frame.get_or_insert_with(VideoFrame::empty);
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&frame.frame, rgb_frame)?;
        }

        let buffer = frame_to_buffer(rgb_frame, width, height, 3);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramegrabError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}
