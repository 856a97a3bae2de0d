use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{
    Backend, Cadence, CaptureRequest, ExtractOptions, ExtractionReport, FfmpegLogLevel,
    ImageFormat, MediaProbe, PreviewOptions, ProgressCallback, ProgressInfo, TargetOutcome,
    naming::format_timestamp, scratch::DEFAULT_SCRATCH_DIRECTORY,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab info input.mp4 --json\n  framegrab snapshot input.mp4 --at 0:01:12.5\n  framegrab batch input.mp4 --start 10 --end 20 --fps 24 --format jpg --progress\n  framegrab preview input.mp4 --at 95\n  framegrab completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Grab still frames from a video, one snapshot or a whole range",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Print every target's outcome.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while capturing.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory that receives session folders.
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,
}

/// Options shared by the capture subcommands.
#[derive(Debug, Parser, Clone)]
struct CaptureArguments {
    /// Image format: png (lossless) or jpg (lossy).
    #[arg(long, default_value = "png")]
    format: String,

    /// Decoding backend: native or command.
    #[arg(long, default_value = "native")]
    backend: String,

    /// ffmpeg program used by the command backend.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print duration and frame rate.
    #[command(
        about = "Print video duration and frame rate",
        visible_alias = "probe",
        after_help = "Examples:\n  framegrab info input.mp4\n  framegrab info input.mp4 --json"
    )]
    Info {
        /// Input video path.
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Capture the frame at one position.
    #[command(
        about = "Capture a single frame",
        after_help = "Examples:\n  framegrab snapshot input.mp4 --at 12.5\n  framegrab snapshot input.mp4 --at 1:02:03 --format jpg"
    )]
    Snapshot {
        /// Input video path.
        input: PathBuf,
        /// Position as seconds, MM:SS or HH:MM:SS(.fff).
        #[arg(long)]
        at: String,
        #[command(flatten)]
        capture: CaptureArguments,
    },

    /// Capture a range at a fixed cadence.
    #[command(
        about = "Capture a range of frames",
        after_help = "Examples:\n  framegrab batch input.mp4 --start 0 --end 30 --interval 0.5\n  framegrab batch input.mp4 --start 1:00 --end 1:10 --fps 24 --format jpg"
    )]
    Batch {
        /// Input video path.
        input: PathBuf,
        /// Range start.
        #[arg(long, default_value = "0")]
        start: String,
        /// Range end. Defaults to the video duration.
        #[arg(long)]
        end: Option<String>,
        /// Seconds between captures.
        #[arg(long, default_value_t = 1.0)]
        interval: f64,
        /// Captures per second; overrides --interval.
        #[arg(long)]
        fps: Option<f64>,
        #[command(flatten)]
        capture: CaptureArguments,
    },

    /// Write a small JPEG of one position.
    #[command(about = "Render a preview thumbnail")]
    Preview {
        /// Input video path.
        input: PathBuf,
        /// Position as seconds, MM:SS or HH:MM:SS(.fff).
        #[arg(long, default_value = "0")]
        at: String,
        /// Preview file. Defaults to the scratch directory.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 480)]
        max_width: u32,
        #[arg(long, default_value_t = 270)]
        max_height: u32,
    },

    /// Empty the scratch directory.
    #[command(about = "Empty the scratch directory")]
    Clean {
        /// Scratch directory to reset.
        #[arg(long, default_value = DEFAULT_SCRATCH_DIRECTORY)]
        directory: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn parse_timecode(value: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let text = value.trim();
    if text.is_empty() {
        return Err("empty time value".into());
    }

    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() > 3 {
        return Err(format!("expected SECONDS, MM:SS or HH:MM:SS, got {text}").into());
    }

    // Seconds may be fractional; minute and hour fields must be whole.
    let mut total = 0.0;
    for (position, field) in fields.iter().enumerate() {
        let is_seconds = position + 1 == fields.len();
        let amount: f64 = field
            .parse()
            .map_err(|_| format!("bad time field {field:?} in {text}"))?;
        if !amount.is_finite() || amount < 0.0 || (!is_seconds && amount.fract() != 0.0) {
            return Err(format!("bad time field {field:?} in {text}").into());
        }
        total = total * 60.0 + amount;
    }
    Ok(total)
}

fn parse_backend(value: &str, program: &Path) -> Option<Backend> {
    match value.to_ascii_lowercase().as_str() {
        "native" | "libav" => Some(Backend::Native),
        "command" | "cli" | "ffmpeg" => Some(Backend::Command {
            program: program.to_path_buf(),
        }),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        framegrab::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn capture_options(
    global: &GlobalOptions,
    capture: &CaptureArguments,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let image_format: ImageFormat = capture.format.parse()?;
    let backend = parse_backend(&capture.backend, &capture.ffmpeg)
        .ok_or(format!("unsupported --backend: {}", capture.backend))?;

    let mut options = ExtractOptions::new()
        .with_image_format(image_format)
        .with_backend(backend);
    if let Some(root) = &global.output_root {
        options = options.with_output_root(root.clone());
    }
    Ok(options)
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format_timestamp(timestamp));
        }
    }
}

fn run_capture(
    input: &Path,
    request: &CaptureRequest,
    mut options: ExtractOptions,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = if global.progress {
        let progress = Arc::new(BarProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let result = framegrab::extract(input, request, &options);
    if let Some(progress) = &progress {
        progress.bar.finish_and_clear();
    }
    let report = result?;

    if global.verbose {
        print_outcomes(&report);
    }
    println!("{}", report.summary().green().bold());

    let skipped = report.dropped_count() + report.failed_count();
    if skipped > 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("{skipped} target(s) produced no image").yellow()
        );
    }
    Ok(())
}

fn print_outcomes(report: &ExtractionReport) {
    for target in &report.targets {
        let label = format_timestamp(target.timestamp);
        match &target.outcome {
            TargetOutcome::Saved(path) => eprintln!("{label} -> {}", path.display()),
            TargetOutcome::Dropped => eprintln!("{label} {}", "dropped".yellow()),
            TargetOutcome::Failed(reason) => eprintln!("{label} {} {reason}", "failed".red()),
            TargetOutcome::Cancelled => eprintln!("{label} {}", "cancelled".yellow()),
            TargetOutcome::Unreached => eprintln!("{label} {}", "past end of video".yellow()),
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            let info = MediaProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "format": info.format,
                    "codec": info.codec,
                    "duration_seconds": info.duration.as_secs_f64(),
                    "duration_source": format!("{:?}", info.duration_source).to_ascii_lowercase(),
                    "fps": info.frames_per_second,
                    "width": info.width,
                    "height": info.height,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", info.format);
                println!(
                    "Duration: {} ({:?})",
                    format_timestamp(info.duration.as_secs_f64()),
                    info.duration_source
                );
                println!(
                    "Video: {}x{} @ {:.3} fps [{}]",
                    info.width, info.height, info.frames_per_second, info.codec
                );
                if !info.duration_known() {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        "duration unknown, showing the fallback value".yellow()
                    );
                }
            }
        }
        Commands::Snapshot { input, at, capture } => {
            let position = parse_timecode(&at)?;
            let options = capture_options(&cli.global, &capture)?;
            run_capture(
                &input,
                &CaptureRequest::single(position),
                options,
                &cli.global,
            )?;
        }
        Commands::Batch {
            input,
            start,
            end,
            interval,
            fps,
            capture,
        } => {
            let start = parse_timecode(&start)?;
            let end = match end {
                Some(end) => parse_timecode(&end)?,
                None => MediaProbe::probe_or_fallback(&input).duration.as_secs_f64(),
            };
            if start > end {
                return Err("--start must be <= --end".into());
            }
            let cadence = Cadence::from_settings(fps.is_some(), fps.unwrap_or(0.0), interval);
            if cli.global.verbose {
                eprintln!("capturing {start:.3}s..{end:.3}s {cadence}");
            }

            let options = capture_options(&cli.global, &capture)?;
            run_capture(
                &input,
                &CaptureRequest::batch(start, end, cadence),
                options,
                &cli.global,
            )?;
        }
        Commands::Preview {
            input,
            at,
            out,
            max_width,
            max_height,
        } => {
            let position = parse_timecode(&at)?;
            let mut options = PreviewOptions::new().with_max_size(max_width, max_height);
            if let Some(out) = out {
                options = options.with_path(out);
            }
            let path = framegrab::preview::render(&input, position, &options)?;
            println!("{}", path.display());
        }
        Commands::Clean { directory } => {
            framegrab::scratch::reset(&directory)?;
            println!("{} {}", "emptied".green().bold(), directory.display());
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use framegrab::Backend;

    use super::{Cli, Commands, parse_backend, parse_timecode};

    #[test]
    fn parse_timecode_formats() {
        assert_eq!(parse_timecode("75").unwrap(), 75.0);
        assert_eq!(parse_timecode("01:15").unwrap(), 75.0);
        assert_eq!(parse_timecode("00:01:15.5").unwrap(), 75.5);
        assert_eq!(parse_timecode("1:02:03").unwrap(), 3723.0);
    }

    #[test]
    fn parse_timecode_rejects_garbage() {
        assert!(parse_timecode("").is_err());
        assert!(parse_timecode("-3").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
        assert!(parse_timecode("ab:cd").is_err());
    }

    #[test]
    fn parse_backend_aliases() {
        let program = Path::new("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(parse_backend("native", program), Some(Backend::Native));
        assert_eq!(
            parse_backend("Command", program),
            Some(Backend::Command {
                program: program.to_path_buf()
            })
        );
        assert!(parse_backend("gstreamer", program).is_none());
    }

    #[test]
    fn batch_arguments_parse() {
        let cli = Cli::try_parse_from([
            "framegrab",
            "--output-root",
            "out",
            "batch",
            "clip.mp4",
            "--start",
            "1:00",
            "--end",
            "1:10",
            "--fps",
            "24",
            "--format",
            "jpg",
        ])
        .unwrap();

        assert_eq!(cli.global.output_root.as_deref(), Some(Path::new("out")));
        match cli.command {
            Commands::Batch {
                start,
                end,
                fps,
                capture,
                ..
            } => {
                assert_eq!(start, "1:00");
                assert_eq!(end.as_deref(), Some("1:10"));
                assert_eq!(fps, Some(24.0));
                assert_eq!(capture.format, "jpg");
                assert_eq!(capture.backend, "native");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
