//! Error handling integration tests.
//!
//! These tests verify that whole-job failures come back as meaningful errors
//! and that the status-line wrapper turns them into text.

use std::path::Path;

use framegrab::{
    Backend, Cadence, CaptureRequest, ExtractOptions, FramegrabError, MediaFile,
};

#[test]
fn open_nonexistent_file() {
    let result = MediaFile::open("this_file_does_not_exist.mp4");
    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = MediaFile::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn extract_missing_file_creates_no_session() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_output_root(root.path().join("out"));
    let request = CaptureRequest::batch(0.0, 2.0, Cadence::Interval(1.0));

    let result = framegrab::extract("this_file_does_not_exist.mp4", &request, &options);
    assert!(matches!(result, Err(FramegrabError::FileOpen { .. })));
    assert!(!root.path().join("out").exists());
}

#[test]
fn command_backend_missing_file() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new()
        .with_output_root(root.path())
        .with_backend(Backend::command());
    let request = CaptureRequest::single(1.0);

    let result = framegrab::extract("this_file_does_not_exist.mp4", &request, &options);
    assert!(matches!(result, Err(FramegrabError::FileOpen { .. })));
}

#[test]
fn status_line_carries_the_error_text() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = ExtractOptions::new().with_output_root(root.path());
    let request = CaptureRequest::single(1.0);

    let (status, paths) =
        framegrab::extract_with_status("this_file_does_not_exist.mp4", &request, &options);
    assert!(status.starts_with("Error: Failed to open media file"), "status: {status}");
    assert!(paths.is_empty());
}

#[test]
fn invalid_request_is_rejected_before_opening() {
    let options = ExtractOptions::new();

    let zero_interval = CaptureRequest::batch(0.0, 5.0, Cadence::Interval(0.0));
    let error = framegrab::extract("whatever.mp4", &zero_interval, &options).unwrap_err();
    assert!(matches!(error, FramegrabError::InvalidInterval(_)));
    assert!(error.to_string().contains("greater than zero"));

    let zero_fps = CaptureRequest::batch(0.0, 5.0, Cadence::FramesPerSecond(0.0));
    assert!(matches!(
        framegrab::extract("whatever.mp4", &zero_fps, &options),
        Err(FramegrabError::InvalidInterval(_))
    ));

    let empty = CaptureRequest::batch(5.0, 1.0, Cadence::Interval(1.0));
    assert!(matches!(
        framegrab::extract("whatever.mp4", &empty, &options),
        Err(FramegrabError::NothingToExtract { .. })
    ));

    let negative = CaptureRequest::single(-3.0);
    assert!(matches!(
        framegrab::extract("whatever.mp4", &negative, &options),
        Err(FramegrabError::InvalidTimestamp(_))
    ));
}

#[test]
fn no_video_stream_error() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let result = MediaFile::open(path);
    assert!(matches!(result, Err(FramegrabError::NoVideoStream)));
}

#[test]
fn preview_of_missing_file() {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let options = framegrab::PreviewOptions::new().with_path(root.path().join("p.jpg"));

    let result = framegrab::preview::render("this_file_does_not_exist.mp4", 0.0, &options);
    assert!(matches!(result, Err(FramegrabError::FileOpen { .. })));
    assert!(matches!(
        framegrab::preview::render("this_file_does_not_exist.mp4", -1.0, &options),
        Err(FramegrabError::InvalidTimestamp(_))
    ));
}
