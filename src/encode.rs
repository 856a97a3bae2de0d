//! Still image encoding.
//!
//! Captured frames are written either losslessly as PNG with the cheapest
//! compression setting, or lossily as JPEG at a fixed high quality. Both
//! encoders come from the [`image`] crate.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    io::Write,
    path::Path,
    str::FromStr,
};

use image::{
    DynamicImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
};

use crate::error::FramegrabError;

/// JPEG quality used for lossy output.
pub const JPEG_QUALITY: u8 = 95;

/// Output encoding for captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Lossless PNG, fast compression. This is the default.
    #[default]
    Png,
    /// Lossy JPEG at [`JPEG_QUALITY`].
    Jpeg,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// `true` for the lossless format.
    pub fn is_lossless(self) -> bool {
        matches!(self, ImageFormat::Png)
    }

    /// The `-q:v` value passed to the `ffmpeg` program for this format.
    pub(crate) fn command_quality(self) -> u8 {
        match self {
            ImageFormat::Png => 1,
            ImageFormat::Jpeg => 2,
        }
    }

    /// Encode `image` and write it to `path`, replacing any existing file.
    ///
    /// The image is encoded in memory first, so a failed encode never leaves
    /// a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::ImageError`] if encoding fails and
    /// [`FramegrabError::IoError`] if the file cannot be written.
    pub fn write(self, image: &DynamicImage, path: &Path) -> Result<(), FramegrabError> {
        let encoded = self.encode(image)?;
        if let Err(error) = fs::write(path, &encoded) {
            // Don't leave a truncated image where a frame is expected.
            let _ = fs::remove_file(path);
            return Err(error.into());
        }
        Ok(())
    }

    fn encode(self, image: &DynamicImage) -> Result<Vec<u8>, FramegrabError> {
        let mut encoded = Vec::new();
        match self {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut encoded,
                    CompressionType::Fast,
                    FilterType::Adaptive,
                );
                image.write_with_encoder(encoder)?;
            }
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
                write_jpeg(image, encoder)?;
            }
        }
        Ok(encoded)
    }
}

/// JPEG has no alpha channel; anything that is not RGB8 is flattened first.
pub(crate) fn write_jpeg<W: Write>(
    image: &DynamicImage,
    encoder: JpegEncoder<W>,
) -> Result<(), FramegrabError> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => {
            image.write_with_encoder(encoder)?
        }
        other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder)?,
    }
    Ok(())
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageFormat::Png => write!(f, "PNG"),
            ImageFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" | "lossless" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" | "lossy" => Ok(ImageFormat::Jpeg),
            other => Err(format!("unsupported image format: {other} (png|jpg)")),
        }
    }
}
