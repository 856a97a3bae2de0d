//! Grab a snapshot and a short batch from a video file.
//!
//! Usage:
//!   cargo run --example extract_frames -- <input_file> [output_root]

use std::error::Error;

use framegrab::{
    Cadence, CaptureRequest, ExtractOptions, FfmpegLogLevel, ImageFormat, MediaProbe,
    TargetOutcome,
};

fn main() -> Result<(), Box<dyn Error>> {
    let mut arguments = std::env::args().skip(1);
    let input_path = arguments.next().unwrap_or_else(|| "input.mp4".to_string());
    let output_root = arguments
        .next()
        .unwrap_or_else(|| "extracted_frames".to_string());

    framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let info = MediaProbe::probe(&input_path)?;
    println!(
        "Video: {}x{}, {:.3} fps, {:.2}s ({:?})",
        info.width,
        info.height,
        info.frames_per_second,
        info.duration.as_secs_f64(),
        info.duration_source,
    );

    // One lossless snapshot from the middle of the file.
    let middle = info.duration.as_secs_f64() / 2.0;
    let options = ExtractOptions::new().with_output_root(&output_root);
    let report = framegrab::extract(&input_path, &CaptureRequest::single(middle), &options)?;
    println!("{}", report.summary());

    // The first ten seconds at 2 fps, as JPEG.
    let end = info.duration.as_secs_f64().min(10.0);
    let request = CaptureRequest::batch(0.0, end, Cadence::FramesPerSecond(2.0));
    let options = options.with_image_format(ImageFormat::Jpeg);
    let report = framegrab::extract(&input_path, &request, &options)?;

    for target in &report.targets {
        match &target.outcome {
            TargetOutcome::Saved(path) => {
                println!("{:>8.3}s  {}", target.timestamp, path.display());
            }
            other => println!("{:>8.3}s  {other:?}", target.timestamp),
        }
    }
    println!("{}", report.summary());

    Ok(())
}
