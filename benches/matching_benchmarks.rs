//! Benchmarks for target generation, matching, and end-to-end capture.
//!
//! Run with: cargo bench
//!
//! The capture benchmarks require fixture files from
//! `tests/fixtures/generate_fixtures.sh`; the matcher benchmarks do not.

use std::{convert::Infallible, hint::black_box, path::Path};

use criterion::{BenchmarkId, Criterion};
use framegrab::{
    Cadence, CaptureRequest, ExtractOptions, FfmpegLogLevel, ImageFormat, TargetTimestamps,
    matcher::{MatchWindow, match_frames},
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_target_generation(criterion: &mut Criterion) {
    criterion.bench_function("generate one hour at 24 fps", |bencher| {
        bencher.iter(|| {
            let targets = TargetTimestamps::range(0.0, black_box(3600.0), 1.0 / 24.0).unwrap();
            black_box(targets.len())
        });
    });
}

fn benchmark_matching(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("match 60 s of 30 fps frames");

    let frames: Vec<f64> = (0..1800).map(|i| f64::from(i) / 30.0).collect();
    for rate in [1.0, 10.0, 30.0, 120.0] {
        let interval = 1.0 / rate;
        let targets = TargetTimestamps::range(0.0, 60.0, interval).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{rate} targets/s")),
            &targets,
            |bencher, targets| {
                bencher.iter(|| {
                    let summary = match_frames(
                        targets.as_slice(),
                        MatchWindow::centered(interval),
                        frames.iter().copied().map(Ok::<f64, Infallible>),
                        None,
                        |index, _, _| index,
                    );
                    black_box(summary.matched())
                });
            },
        );
    }

    group.finish();
}

fn benchmark_capture(criterion: &mut Criterion) {
    framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let root = tempfile::tempdir().unwrap();
    let mut group = criterion.benchmark_group("capture");
    group.sample_size(10);

    for format in [ImageFormat::Png, ImageFormat::Jpeg] {
        let options = ExtractOptions::new()
            .with_output_root(root.path())
            .with_image_format(format);

        group.bench_function(format!("single snapshot ({format})"), |bencher| {
            bencher.iter(|| framegrab::extract(SAMPLE_VIDEO, &CaptureRequest::single(2.5), &options).unwrap());
        });

        let request = CaptureRequest::batch(0.0, 4.0, Cadence::FramesPerSecond(5.0));
        group.bench_function(format!("batch 0-4 s at 5 fps ({format})"), |bencher| {
            bencher.iter(|| framegrab::extract(SAMPLE_VIDEO, &request, &options).unwrap());
        });
    }

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_target_generation,
    benchmark_matching,
    benchmark_capture,
);
criterion::criterion_main!(benches);
