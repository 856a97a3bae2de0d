//! Sequential matcher tests.
//!
//! Frame sources here are plain presentation times, so no FFmpeg is needed.

use std::{cell::Cell, convert::Infallible};

use framegrab::{
    CancellationToken,
    matcher::{MatchStatus, MatchWindow, Offer, SequentialMatcher, match_frames},
};

fn ok_frames(times: &[f64]) -> Vec<Result<f64, Infallible>> {
    times.iter().copied().map(Ok).collect()
}

fn matched_times(statuses: &[MatchStatus<f64>]) -> Vec<f64> {
    statuses
        .iter()
        .filter_map(|status| match status {
            MatchStatus::Matched(time) => Some(*time),
            _ => None,
        })
        .collect()
}

#[test]
fn exact_frames_match_one_to_one() {
    let targets = [0.0, 1.0, 2.0, 3.0];
    let summary = match_frames(
        &targets,
        MatchWindow::centered(1.0),
        ok_frames(&[0.0, 1.0, 2.0, 3.0]),
        None,
        |_, _, time| time,
    );

    assert_eq!(matched_times(&summary.statuses), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(summary.matched(), 4);
    assert_eq!(summary.frames_discarded, 0);
    assert!(!summary.cancelled);
}

#[test]
fn handler_receives_target_index_and_time() {
    let targets = [0.5, 1.5];
    let summary = match_frames(
        &targets,
        MatchWindow::centered(1.0),
        ok_frames(&[0.4, 1.4]),
        None,
        |index, target, _| (index, target),
    );

    assert_eq!(
        summary.statuses,
        vec![MatchStatus::Matched((0, 0.5)), MatchStatus::Matched((1, 1.5))]
    );
}

#[test]
fn matched_frames_stay_inside_their_window() {
    let frames: Vec<f64> = (0..90).map(|i| f64::from(i) / 30.0).collect();
    let targets = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
    let window = MatchWindow::centered(0.5);

    let summary = match_frames(&targets, window, ok_frames(&frames), None, |_, target, time| {
        (target, time)
    });

    assert_eq!(summary.matched(), targets.len());
    for status in &summary.statuses {
        let MatchStatus::Matched((target, time)) = status else {
            panic!("unexpected status {status:?}");
        };
        assert!(*time >= window.start(*target) && *time <= window.end(*target));
    }
}

#[test]
fn gap_drops_only_the_uncovered_target() {
    let targets = [0.0, 1.0, 2.0, 3.0, 4.0];
    let summary = match_frames(
        &targets,
        MatchWindow::centered(1.0),
        ok_frames(&[0.0, 1.0, 3.0, 4.0]),
        None,
        |_, _, time| time,
    );

    assert_eq!(
        summary.statuses,
        vec![
            MatchStatus::Matched(0.0),
            MatchStatus::Matched(1.0),
            MatchStatus::Dropped,
            MatchStatus::Matched(3.0),
            MatchStatus::Matched(4.0),
        ]
    );
}

#[test]
fn dense_targets_never_reuse_a_frame() {
    let targets = [0.0, 0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875, 1.0];
    let frames = [0.0, 0.25, 0.5, 0.75, 1.0];

    let summary = match_frames(
        &targets,
        MatchWindow::centered(0.125),
        ok_frames(&frames),
        None,
        |_, _, time| time,
    );

    let matched = matched_times(&summary.statuses);
    assert_eq!(matched, frames.to_vec());
    assert!(matched.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(
        summary
            .statuses
            .iter()
            .filter(|status| **status == MatchStatus::Dropped)
            .count(),
        4
    );
}

#[test]
fn frames_before_the_first_window_are_discarded() {
    let summary = match_frames(
        &[1.0],
        MatchWindow::centered(1.0),
        ok_frames(&[0.0, 0.2, 0.4, 0.98, 1.1]),
        None,
        |_, _, time| time,
    );

    assert_eq!(summary.statuses, vec![MatchStatus::Matched(0.98)]);
    assert_eq!(summary.frames_discarded, 3);
    assert_eq!(summary.frames_seen, 4);
}

#[test]
fn widely_spaced_targets_skip_frames_between_windows() {
    let summary = match_frames(
        &[0.0, 10.0],
        MatchWindow::centered(1.0),
        ok_frames(&[3.0, 10.0]),
        None,
        |_, _, time| time,
    );

    assert_eq!(
        summary.statuses,
        vec![MatchStatus::Dropped, MatchStatus::Matched(10.0)]
    );
    assert_eq!(summary.frames_discarded, 1);
}

#[test]
fn source_ending_early_leaves_targets_unreached() {
    let summary = match_frames(
        &[1.0, 2.0, 3.0],
        MatchWindow::centered(1.0),
        ok_frames(&[1.0]),
        None,
        |_, _, time| time,
    );

    assert_eq!(
        summary.statuses,
        vec![
            MatchStatus::Matched(1.0),
            MatchStatus::Unreached,
            MatchStatus::Unreached,
        ]
    );
}

#[test]
fn stops_pulling_once_targets_are_resolved() {
    let pulled = Cell::new(0_u32);
    let frames = (0..1000).map(|i| {
        pulled.set(pulled.get() + 1);
        Ok::<f64, Infallible>(f64::from(i) * 0.25)
    });

    let summary = match_frames(&[0.0, 0.5], MatchWindow::centered(0.5), frames, None, |_, _, t| t);

    assert_eq!(summary.matched(), 2);
    assert_eq!(pulled.get(), 2);
}

#[test]
fn source_errors_are_skipped() {
    let frames = vec![Ok(1.0), Err("corrupt packet"), Ok(2.0)];
    let summary = match_frames(
        &[1.0, 2.0],
        MatchWindow::centered(1.0),
        frames,
        None,
        |_, _, time| time,
    );

    assert_eq!(matched_times(&summary.statuses), vec![1.0, 2.0]);
    assert_eq!(summary.frames_failed, 1);
}

#[test]
fn single_snapshot_takes_first_frame_at_or_after() {
    let summary = match_frames(
        &[5.0],
        MatchWindow::at_or_after(),
        ok_frames(&[4.0, 4.9, 7.5, 8.0]),
        None,
        |_, _, time| time,
    );

    assert_eq!(summary.statuses, vec![MatchStatus::Matched(7.5)]);
}

#[test]
fn cancelled_before_start_emits_nothing() {
    let token = CancellationToken::new();
    token.cancel();

    let mut calls = 0;
    let summary = match_frames(
        &[0.0, 1.0],
        MatchWindow::centered(1.0),
        ok_frames(&[0.0, 1.0]),
        Some(&token),
        |_, _, time| {
            calls += 1;
            time
        },
    );

    assert_eq!(calls, 0);
    assert!(summary.cancelled);
    assert_eq!(
        summary.statuses,
        vec![MatchStatus::Cancelled, MatchStatus::Cancelled]
    );
}

#[test]
fn cancellation_keeps_earlier_matches() {
    let token = CancellationToken::new();
    let targets = [0.0, 1.0, 2.0, 3.0];

    let summary = match_frames(
        &targets,
        MatchWindow::centered(1.0),
        ok_frames(&[0.0, 1.0, 2.0, 3.0]),
        Some(&token),
        |index, _, time| {
            if index == 1 {
                token.cancel();
            }
            time
        },
    );

    assert!(summary.cancelled);
    assert_eq!(
        summary.statuses,
        vec![
            MatchStatus::Matched(0.0),
            MatchStatus::Matched(1.0),
            MatchStatus::Cancelled,
            MatchStatus::Cancelled,
        ]
    );
}

#[test]
fn offer_reports_each_decision() {
    let targets = [1.0, 2.0, 3.0];
    let mut matcher = SequentialMatcher::new(&targets, MatchWindow::centered(1.0));

    assert_eq!(matcher.offer(0.1), Offer::Early { dropped: 0..0 });
    assert_eq!(
        matcher.offer(1.0),
        Offer::Accepted {
            target_index: 0,
            dropped: 0..0
        }
    );
    assert_eq!(
        matcher.offer(3.2),
        Offer::Accepted {
            target_index: 2,
            dropped: 1..2
        }
    );
    assert!(matcher.is_finished());
    assert_eq!(matcher.offer(4.0), Offer::Exhausted { dropped: 3..3 });
}

#[test]
fn window_bounds_are_inclusive() {
    let window = MatchWindow::centered(1.0);
    assert_eq!(window.start(2.0), 1.5);
    assert_eq!(window.end(2.0), 2.5);

    let targets = [2.0];
    let mut matcher = SequentialMatcher::new(&targets, window);
    assert!(matches!(matcher.offer(2.5), Offer::Accepted { .. }));
}
