//! Per-job capture settings.
//!
//! [`ExtractOptions`] is a builder that threads the output location, image
//! format, decoding backend, progress callback, and cancellation token through
//! a capture job without module-level state.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegrab::{
//!     Backend, CancellationToken, ExtractOptions, ImageFormat, ProgressCallback, ProgressInfo,
//! };
//!
//! struct Ticker;
//!
//! impl ProgressCallback for Ticker {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         eprint!("\r{} captured", info.current);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_output_root("captures")
//!     .with_image_format(ImageFormat::Jpeg)
//!     .with_backend(Backend::Native)
//!     .with_progress(Arc::new(Ticker))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    encode::ImageFormat,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// Default parent directory for session folders.
pub const DEFAULT_OUTPUT_ROOT: &str = "extracted_frames";

/// Default name of the external transcoder program.
pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";

/// Which decoding path drives frame access.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    /// FFmpeg libraries: one seek, forward decode, sequential matching.
    #[default]
    Native,
    /// The `ffmpeg` executable, invoked once per target.
    Command {
        /// Program to run. Resolved through `PATH` when not absolute.
        program: PathBuf,
    },
}

impl Backend {
    /// The command backend using `ffmpeg` from `PATH`.
    pub fn command() -> Self {
        Backend::Command {
            program: PathBuf::from(DEFAULT_FFMPEG_PROGRAM),
        }
    }
}

/// Configuration for a capture job.
///
/// All fields have sensible defaults: frames go to
/// [`DEFAULT_OUTPUT_ROOT`] as PNG through the native backend, with no
/// progress callback and no cancellation.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Parent directory under which each session directory is created.
    pub(crate) output_root: PathBuf,
    /// Encoding of the written images.
    pub(crate) image_format: ImageFormat,
    /// Decoding path.
    pub(crate) backend: Backend,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// `None` means the job runs to completion.
    pub(crate) cancellation: Option<CancellationToken>,
    /// Captured targets between progress reports.
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("output_root", &self.output_root)
            .field("image_format", &self.image_format)
            .field("backend", &self.backend)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// PNG into [`DEFAULT_OUTPUT_ROOT`] through the native backend.
    pub fn new() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            image_format: ImageFormat::default(),
            backend: Backend::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the directory that receives session folders.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.output_root = root.into();
        self
    }

    /// Choose lossless or lossy output.
    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Choose the decoding backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Report progress to `callback`.
    ///
    /// The callback is invoked every [`batch_size`](ExtractOptions::with_batch_size)
    /// captured frames and once when the job ends.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Stop the job when `token` is cancelled.
    ///
    /// When the token is cancelled the job stops at the next frame (or
    /// target, for the command backend) and returns a report with
    /// [`cancelled`](crate::ExtractionReport::cancelled) set. Files already
    /// written are kept.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Report progress every `size` captured targets (at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The directory that receives session folders.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The configured image format.
    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    /// The configured backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// The cancellation token, if one was attached.
    pub(crate) fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation().is_some_and(CancellationToken::is_cancelled)
    }
}
