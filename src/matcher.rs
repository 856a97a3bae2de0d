//! Sequential timestamp-to-frame matching.
//!
//! The decoder is seeked once, to just before the first target, and then
//! decodes forward. Seeks only guarantee landing at or before the requested
//! time, and real streams have timestamp jitter, so frames cannot be matched
//! by exact equality. Instead every target owns a [`MatchWindow`] and the
//! matcher walks the frame stream and the target list together:
//!
//! 1. a frame earlier than the current target's window is discarded;
//! 2. targets whose window ends before the frame are dropped;
//! 3. otherwise the frame is the match for the current target.
//!
//! The cursor only moves forward. A target gets at most one frame, a frame
//! goes to at most one target, and matches come out in target order.
//!
//! The window half-width is derived from the *nominal* interval, not from the
//! stream's real frame spacing. A source sparser than the requested interval
//! will therefore drop targets; those are reported as
//! [`MatchStatus::Dropped`] and never retried.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use framegrab::matcher::{MatchStatus, MatchWindow, match_frames};
//!
//! let targets = [1.0, 2.0, 3.0];
//! let frames = [0.3, 0.98, 1.2, 2.01, 3.4].map(Ok::<f64, Infallible>);
//!
//! let summary = match_frames(&targets, MatchWindow::centered(1.0), frames, None, |_, _, t| t);
//! assert_eq!(
//!     summary.statuses,
//!     vec![
//!         MatchStatus::Matched(0.98),
//!         MatchStatus::Matched(2.01),
//!         MatchStatus::Matched(3.4),
//!     ]
//! );
//! ```

use std::{fmt::Display, ops::Range};

use crate::{progress::CancellationToken, timestamps::TIMESTAMP_EPSILON};

/// Tolerance band around a target timestamp.
///
/// A frame at time `t` satisfies target `T` when
/// `T - before <= t <= T + after`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWindow {
    before: f64,
    after: f64,
}

impl MatchWindow {
    /// A window of half the nominal interval on each side of the target.
    pub fn centered(interval: f64) -> Self {
        let half = interval * 0.5;
        Self {
            before: half,
            after: half,
        }
    }

    /// Accept the first frame at or after the target, however late.
    ///
    /// Used for single snapshots, where there is no neighbouring target to
    /// lose the frame to.
    pub fn at_or_after() -> Self {
        Self {
            before: TIMESTAMP_EPSILON,
            after: f64::INFINITY,
        }
    }

    /// Earliest acceptable presentation time for `target`.
    pub fn start(&self, target: f64) -> f64 {
        target - self.before
    }

    /// Latest acceptable presentation time for `target`.
    pub fn end(&self, target: f64) -> f64 {
        target + self.after
    }
}

/// What the matcher decided for one offered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// The frame precedes the current target's window and is discarded.
    Early {
        /// Targets passed over before deciding.
        dropped: Range<usize>,
    },
    /// The frame is the match for `target_index`.
    Accepted {
        /// Index of the satisfied target.
        target_index: usize,
        /// Targets passed over before this one.
        dropped: Range<usize>,
    },
    /// Every target has been resolved; no more frames are needed.
    Exhausted {
        /// Targets passed over by this frame.
        dropped: Range<usize>,
    },
}

/// Forward-only cursor over a target list.
///
/// Feed presentation times in increasing order through
/// [`offer`](SequentialMatcher::offer).
#[derive(Debug, Clone)]
pub struct SequentialMatcher<'a> {
    targets: &'a [f64],
    window: MatchWindow,
    cursor: usize,
}

impl<'a> SequentialMatcher<'a> {
    /// Start matching against `targets`, which must be strictly increasing.
    pub fn new(targets: &'a [f64], window: MatchWindow) -> Self {
        Self {
            targets,
            window,
            cursor: 0,
        }
    }

    /// Decide what to do with a frame presented at `time` seconds.
    pub fn offer(&mut self, time: f64) -> Offer {
        let total = self.targets.len();
        if self.cursor >= total {
            return Offer::Exhausted {
                dropped: total..total,
            };
        }

        if time < self.window.start(self.targets[self.cursor]) {
            return Offer::Early {
                dropped: self.cursor..self.cursor,
            };
        }

        let first = self.cursor;
        while self.cursor < total && self.window.end(self.targets[self.cursor]) < time {
            self.cursor += 1;
        }
        let dropped = first..self.cursor;

        if self.cursor >= total {
            return Offer::Exhausted { dropped };
        }

        // Only reachable when targets are spaced wider than the window.
        if time < self.window.start(self.targets[self.cursor]) {
            return Offer::Early { dropped };
        }

        let target_index = self.cursor;
        self.cursor += 1;
        Offer::Accepted {
            target_index,
            dropped,
        }
    }

    /// Index of the next unresolved target.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// `true` once every target has been matched or dropped.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.targets.len()
    }
}

/// Anything carrying a presentation time in seconds.
pub trait PresentationTime {
    /// Presentation time of the frame, in seconds from media start.
    fn presentation_time(&self) -> f64;
}

impl PresentationTime for f64 {
    fn presentation_time(&self) -> f64 {
        *self
    }
}

/// Final status of one target after a matching pass.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchStatus<R> {
    /// A frame was accepted; carries whatever the match handler returned.
    Matched(R),
    /// The stream moved past the target's window without a frame inside it.
    Dropped,
    /// Cancellation was observed before the target was resolved.
    Cancelled,
    /// The frame source ended before the target was resolved.
    Unreached,
}

/// Result of [`match_frames`].
#[derive(Debug, Clone)]
pub struct MatchSummary<R> {
    /// One status per target, in target order.
    pub statuses: Vec<MatchStatus<R>>,
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Frames discarded as earlier than the current window.
    pub frames_discarded: u64,
    /// Frames the source failed to produce.
    pub frames_failed: u64,
    /// Whether the pass stopped because of cancellation.
    pub cancelled: bool,
}

impl<R> MatchSummary<R> {
    /// Number of matched targets.
    pub fn matched(&self) -> usize {
        self.statuses
            .iter()
            .filter(|status| matches!(status, MatchStatus::Matched(_)))
            .count()
    }
}

/// Run a full matching pass over a frame source.
///
/// `frames` must yield frames in increasing presentation time. Each accepted
/// frame is handed to `on_match` together with its target index and target
/// timestamp; the handler's return value is stored in the summary. Source
/// errors skip the offending frame and the pass continues. The cancellation
/// token, when given, is checked before each frame is pulled.
pub fn match_frames<I, F, E, R, H>(
    targets: &[f64],
    window: MatchWindow,
    frames: I,
    cancellation: Option<&CancellationToken>,
    mut on_match: H,
) -> MatchSummary<R>
where
    I: IntoIterator<Item = Result<F, E>>,
    F: PresentationTime,
    E: Display,
    H: FnMut(usize, f64, F) -> R,
{
    let mut statuses: Vec<Option<MatchStatus<R>>> = targets.iter().map(|_| None).collect();
    let mut matcher = SequentialMatcher::new(targets, window);
    let mut frames = frames.into_iter();
    let mut frames_seen = 0_u64;
    let mut frames_discarded = 0_u64;
    let mut frames_failed = 0_u64;
    let mut cancelled = false;

    while !matcher.is_finished() {
        if cancellation.is_some_and(|token| token.is_cancelled()) {
            log::debug!("Matching cancelled at target {}", matcher.cursor());
            cancelled = true;
            break;
        }

        let frame = match frames.next() {
            Some(Ok(frame)) => frame,
            Some(Err(error)) => {
                log::warn!("Skipping undecodable frame: {error}");
                frames_failed += 1;
                continue;
            }
            None => break,
        };
        frames_seen += 1;

        let time = frame.presentation_time();
        let dropped = match matcher.offer(time) {
            Offer::Early { dropped } => {
                frames_discarded += 1;
                dropped
            }
            Offer::Exhausted { dropped } => dropped,
            Offer::Accepted {
                target_index,
                dropped,
            } => {
                let result = on_match(target_index, targets[target_index], frame);
                statuses[target_index] = Some(MatchStatus::Matched(result));
                dropped
            }
        };

        for index in dropped {
            log::debug!(
                "Dropped target {index} at {:.3}s: stream reached {time:.3}s",
                targets[index]
            );
            statuses[index] = Some(MatchStatus::Dropped);
        }
    }

    let statuses = statuses
        .into_iter()
        .map(|status| {
            status.unwrap_or(if cancelled {
                MatchStatus::Cancelled
            } else {
                MatchStatus::Unreached
            })
        })
        .collect();

    MatchSummary {
        statuses,
        frames_seen,
        frames_discarded,
        frames_failed,
        cancelled,
    }
}
