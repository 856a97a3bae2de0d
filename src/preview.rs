//! Live preview thumbnail.
//!
//! A quick look at the playhead: seek, take the first decoded frame, shrink
//! it to fit a small box, and overwrite a single JPEG. Seeking lands on a
//! keyframe, so the picture may be slightly before the requested position.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};

use crate::{
    encode::write_jpeg,
    error::FramegrabError,
    media::{FrameConverter, MediaFile},
    progress::CancellationToken,
    scratch::DEFAULT_SCRATCH_DIRECTORY,
    utilities::fit_within,
};

/// File name of the preview inside the scratch directory.
pub const PREVIEW_FILE_NAME: &str = "preview_live.jpg";

/// Options for [`render`].
///
/// # Example
///
/// ```no_run
/// use framegrab::preview::{self, PreviewOptions};
///
/// let options = PreviewOptions::new().with_max_size(320, 180);
/// let path = preview::render("input.mp4", 42.0, &options)?;
/// println!("{}", path.display());
/// # Ok::<(), framegrab::FramegrabError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct PreviewOptions {
    /// Where the preview is written. Overwritten on every call.
    pub path: PathBuf,
    /// Largest allowed width.
    pub max_width: u32,
    /// Largest allowed height.
    pub max_height: u32,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
    cancellation: Option<CancellationToken>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewOptions {
    /// 480×270 at quality 70, written to
    /// `temp_previews/preview_live.jpg`.
    pub fn new() -> Self {
        Self {
            path: Path::new(DEFAULT_SCRATCH_DIRECTORY).join(PREVIEW_FILE_NAME),
            max_width: 480,
            max_height: 270,
            quality: 70,
            cancellation: None,
        }
    }

    /// Write the preview somewhere else.
    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Change the bounding box.
    pub fn with_max_size(mut self, width: u32, height: u32) -> Self {
        self.max_width = width.max(1);
        self.max_height = height.max(1);
        self
    }

    /// Change the JPEG quality. Clamped to `1..=100`.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Skip rendering when `token` is already cancelled.
    ///
    /// A newer playhead position usually supersedes an in-flight preview.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Render the preview for `position` seconds and return the written path.
///
/// # Errors
///
/// Returns [`FramegrabError::Cancelled`] if the token was cancelled,
/// [`FramegrabError::InvalidTimestamp`] for a negative position,
/// [`FramegrabError::VideoDecodeError`] if no frame could be decoded, and
/// the usual open, seek, and write errors.
pub fn render<P: AsRef<Path>>(
    path: P,
    position: f64,
    options: &PreviewOptions,
) -> Result<PathBuf, FramegrabError> {
    if !(position.is_finite() && position >= 0.0) {
        return Err(FramegrabError::InvalidTimestamp(position));
    }
    let is_cancelled = || {
        options
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    };
    if is_cancelled() {
        return Err(FramegrabError::Cancelled);
    }

    let mut media = MediaFile::open(path)?;
    let frame = media
        .decode_from(position)?
        .find_map(Result::ok)
        .ok_or_else(|| {
            FramegrabError::VideoDecodeError(format!("no decodable frame near {position:.3}s"))
        })?;
    if is_cancelled() {
        return Err(FramegrabError::Cancelled);
    }

    let image = FrameConverter::new().to_image(&frame)?;
    let (width, height) = fit_within(
        image.width(),
        image.height(),
        options.max_width,
        options.max_height,
    );
    let thumbnail = if (width, height) == (image.width(), image.height()) {
        image
    } else {
        image.resize_exact(width, height, FilterType::Triangle)
    };

    if let Some(parent) = options.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut encoded = Vec::new();
    write_jpeg(
        &thumbnail,
        JpegEncoder::new_with_quality(&mut encoded, options.quality),
    )?;
    fs::write(&options.path, encoded)?;

    log::debug!(
        "Preview at {position:.3}s (frame {:.3}s, {width}x{height}) -> {}",
        frame.presentation_time(),
        options.path.display()
    );
    Ok(options.path.clone())
}
