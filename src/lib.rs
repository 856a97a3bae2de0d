//! # framegrab
//!
//! Pull still images out of a video at a single instant or at a regular
//! cadence over a time range.
//!
//! A batch capture seeks once and decodes forward, pairing each decoded frame
//! with the capture targets through a forward-only
//! [`matcher`](crate::matcher). Every frame is decoded at most once and every
//! target gets at most one image, so long ranges at high rates stay cheap.
//! Decoding goes through FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); images are written
//! with the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ### One snapshot
//!
//! ```no_run
//! use framegrab::{CaptureRequest, ExtractOptions};
//!
//! let report = framegrab::extract("input.mp4", &CaptureRequest::single(12.5), &ExtractOptions::new())?;
//! println!("{}", report.summary());
//! # Ok::<(), framegrab::FramegrabError>(())
//! ```
//!
//! ### Every frame of a range at 24 fps, as JPEG
//!
//! ```no_run
//! use framegrab::{Cadence, CaptureRequest, ExtractOptions, ImageFormat};
//!
//! let options = ExtractOptions::new()
//!     .with_output_root("captures")
//!     .with_image_format(ImageFormat::Jpeg);
//! let request = CaptureRequest::batch(60.0, 75.0, Cadence::FramesPerSecond(24.0));
//!
//! let (status, paths) = framegrab::extract_with_status("input.mp4", &request, &options);
//! println!("{status} ({} files)", paths.len());
//! ```
//!
//! ### Probe before capturing
//!
//! ```no_run
//! use framegrab::MediaProbe;
//!
//! let info = MediaProbe::probe_or_fallback("input.mp4");
//! println!("{:?} at {} fps", info.duration, info.frames_per_second);
//! ```
//!
//! ## Features
//!
//! - **Single and batch capture**: playhead snapshot, or a range at a fixed
//!   interval or frame rate
//! - **Sequential matching**: one seek, one forward decode, no frame reused
//! - **Per-target outcomes**: saved, dropped, failed, cancelled, or unreached
//! - **Lossless or lossy output**: PNG (fast compression) or JPEG quality 95
//! - **Two backends**: FFmpeg libraries, or the `ffmpeg` executable per target
//! - **Progress & cancellation**: callbacks and a per-job `CancellationToken`
//! - **Live preview**: small JPEG thumbnail of the playhead position
//! - **Probing**: duration with fallbacks and native frame rate
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed. The command backend
//! additionally needs an `ffmpeg` executable.

mod command;
pub mod configuration;
pub mod encode;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod matcher;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod preview;
pub mod probe;
pub mod progress;
pub mod scratch;
pub mod timestamps;
mod utilities;

pub use configuration::{Backend, ExtractOptions};
pub use encode::ImageFormat;
pub use error::FramegrabError;
pub use extract::{
    CaptureMode, CaptureRequest, ExtractionReport, TargetOutcome, TargetResult, extract,
    extract_with_status,
};
pub use ffmpeg::{FfmpegLogLevel, ffmpeg_log_level, set_ffmpeg_log_level};
pub use matcher::{MatchWindow, SequentialMatcher};
pub use media::{DecodedFrame, DecodedFrames, FrameConverter, MediaFile};
pub use metadata::{DurationSource, VideoInfo};
pub use naming::SessionKind;
pub use preview::PreviewOptions;
pub use probe::MediaProbe;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use timestamps::{Cadence, TargetTimestamps};
