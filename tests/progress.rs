//! Progress reporting integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use framegrab::{
    Cadence, CaptureRequest, ExtractOptions, OperationType, ProgressCallback, ProgressInfo,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.reports.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_reports_every_capture() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let recorder = Arc::new(Recorder::default());
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_output_root(root.path())
        .with_progress(recorder.clone());
    let request = CaptureRequest::batch(0.0, 1.0, Cadence::Interval(0.25));
    let report = framegrab::extract(path, &request, &options).expect("Failed to capture");
    assert_eq!(report.saved_count(), 5);

    let reports = recorder.reports.lock().unwrap();
    // One per capture plus the final report.
    assert_eq!(reports.len(), 6);
    assert!(
        reports
            .iter()
            .all(|info| info.operation == OperationType::NativeExtraction)
    );
    assert!(reports.iter().all(|info| info.total == Some(5)));

    let currents: Vec<u64> = reports.iter().map(|info| info.current).collect();
    assert_eq!(currents, vec![1, 2, 3, 4, 5, 5]);
    assert_eq!(reports[1].current_timestamp, Some(0.25));

    let last = reports.last().unwrap();
    assert_eq!(last.percentage, Some(100.0));
    assert_eq!(last.current_timestamp, None);
    assert!(last.is_complete());
    assert!(!reports[0].is_complete());
}

#[test]
fn progress_batch_size_thins_reports() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let recorder = Arc::new(Recorder::default());
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_output_root(root.path())
        .with_progress(recorder.clone())
        .with_batch_size(4);
    let request = CaptureRequest::batch(0.0, 2.0, Cadence::Interval(0.25));
    let report = framegrab::extract(path, &request, &options).expect("Failed to capture");
    assert_eq!(report.saved_count(), 9);

    let currents: Vec<u64> = recorder
        .reports
        .lock()
        .unwrap()
        .iter()
        .map(|info| info.current)
        .collect();
    assert_eq!(currents, vec![4, 8, 9]);
}

#[test]
fn failed_open_sends_no_progress() {
    let recorder = Arc::new(Recorder::default());
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_output_root(root.path())
        .with_progress(recorder.clone());

    let result = framegrab::extract(
        "this_file_does_not_exist.mp4",
        &CaptureRequest::single(0.0),
        &options,
    );
    assert!(result.is_err());
    assert!(recorder.reports.lock().unwrap().is_empty());
}
