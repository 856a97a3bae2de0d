//! Capture through the `ffmpeg` executable.
//!
//! One process per target: `ffmpeg -ss <t> -i <input> -frames:v 1 -q:v <q> -y
//! <output>`. Input seeking puts the output on the first frame at or after
//! `t`. Slower than the native path on long batches, but it needs nothing
//! beyond a working `ffmpeg` on `PATH`.

use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::{
    configuration::ExtractOptions,
    error::FramegrabError,
    extract::TargetOutcome,
    naming::frame_path,
    progress::{OperationType, ProgressTracker},
    timestamps::TargetTimestamps,
};

/// Run `program` once per target, in order.
///
/// A failed invocation marks its target [`TargetOutcome::Failed`] and the
/// loop moves on. Cancellation is checked before each launch; once it is
/// seen every remaining target is [`TargetOutcome::Cancelled`].
pub(crate) fn extract_with_program(
    program: &Path,
    input: &Path,
    targets: &TargetTimestamps,
    session_directory: &Path,
    options: &ExtractOptions,
) -> Vec<TargetOutcome> {
    let image_format = options.image_format();
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::CommandExtraction,
        targets.len() as u64,
        options.batch_size,
    );

    let mut outcomes = Vec::with_capacity(targets.len());
    for &target in targets.as_slice() {
        if options.is_cancelled() {
            log::debug!("Command capture cancelled at {target:.3}s");
            outcomes.resize(targets.len(), TargetOutcome::Cancelled);
            break;
        }

        let output_path = frame_path(session_directory, target, image_format);
        let outcome = match capture_one(
            program,
            input,
            target,
            &output_path,
            image_format.command_quality(),
        ) {
            Ok(()) => TargetOutcome::Saved(output_path),
            Err(error) => {
                log::warn!("Skipping target {target:.3}s: {error}");
                TargetOutcome::Failed(error.to_string())
            }
        };
        tracker.advance(target);
        outcomes.push(outcome);
    }
    tracker.finish();

    outcomes
}

fn capture_one(
    program: &Path,
    input: &Path,
    target: f64,
    output_path: &Path,
    quality: u8,
) -> Result<(), FramegrabError> {
    let output = Command::new(program)
        .args(["-hide_banner", "-loglevel", "error"])
        .arg("-ss")
        .arg(format!("{target:.6}"))
        .arg("-i")
        .arg(input)
        .args(["-frames:v", "1"])
        .arg("-q:v")
        .arg(quality.to_string())
        .arg("-y")
        .arg(output_path)
        .stdin(Stdio::null())
        .output()
        .map_err(|error| {
            FramegrabError::CommandFailed(format!(
                "could not run {}: {error}",
                program.display()
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FramegrabError::CommandFailed(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        )));
    }

    // Seeking past the last frame exits cleanly without writing anything.
    if !output_path.is_file() {
        return Err(FramegrabError::CommandFailed(format!(
            "no frame at {target:.3}s"
        )));
    }

    Ok(())
}
