//! FFmpeg console verbosity.
//!
//! The FFmpeg libraries print to stderr on their own, independently of the
//! `log` facade used by this crate. Broken streams in particular produce a
//! lot of decoder chatter during a batch capture; these helpers quiet it
//! without reaching into `ffmpeg-next`.
//!
//! ```no_run
//! use framegrab::FfmpegLogLevel;
//!
//! framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! assert_eq!(framegrab::ffmpeg_log_level(), Some(FfmpegLogLevel::Error));
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// FFmpeg log level, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Nothing at all.
    Quiet,
    /// Unrecoverable failures only.
    Fatal,
    /// Recoverable errors, such as corrupt packets.
    Error,
    /// FFmpeg's own default.
    Warning,
    /// Informational messages.
    Info,
    /// Decoder internals.
    Debug,
}

const LEVELS: [(FfmpegLogLevel, &str, Level); 6] = [
    (FfmpegLogLevel::Quiet, "quiet", Level::Quiet),
    (FfmpegLogLevel::Fatal, "fatal", Level::Fatal),
    (FfmpegLogLevel::Error, "error", Level::Error),
    (FfmpegLogLevel::Warning, "warning", Level::Warning),
    (FfmpegLogLevel::Info, "info", Level::Info),
    (FfmpegLogLevel::Debug, "debug", Level::Debug),
];

impl FfmpegLogLevel {
    fn entry(self) -> (FfmpegLogLevel, &'static str, Level) {
        LEVELS
            .into_iter()
            .find(|(level, _, _)| *level == self)
            .unwrap_or(LEVELS[3])
    }

    /// Lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        self.entry().1
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        let value = match value.as_str() {
            "warn" => "warning",
            "silent" | "off" => "quiet",
            other => other,
        };
        LEVELS
            .into_iter()
            .find(|(_, name, _)| *name == value)
            .map(|(level, _, _)| level)
            .ok_or_else(|| {
                let names: Vec<&str> = LEVELS.iter().map(|(_, name, _)| *name).collect();
                format!(
                    "unknown FFmpeg log level '{value}', expected one of: {}",
                    names.join(", ")
                )
            })
    }
}

/// Set how much FFmpeg prints to stderr.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.entry().2);
}

/// Current FFmpeg log level, if it is one of the [`FfmpegLogLevel`] values.
pub fn ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    let current = ffmpeg_next::util::log::get_level().ok()?;
    LEVELS
        .into_iter()
        .find(|(_, _, level)| *level == current)
        .map(|(level, _, _)| level)
}
