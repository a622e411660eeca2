// Command-line front-end for the WebP converter.
// All conversion logic lives in the library; this file only parses arguments,
// wires up logging and renders progress and results.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use webp_converter_lib::{
    AppState, BatchConfig, ConversionOptions, Progress, ProgressType, convert_image,
    convert_images, core::DEFAULT_QUALITY,
};

/// Convert JPEG, PNG, BMP and other raster images to lossy WebP.
#[derive(Debug, Parser)]
#[command(name = "webp-converter", version, about)]
struct Cli {
    /// Images to convert
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// WebP quality, 1 (smallest) to 100 (best)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: u32,

    /// Existing directory for all outputs (default: next to each input)
    #[arg(short = 'o', long, conflicts_with = "output")]
    output_dir: Option<PathBuf>,

    /// Explicit output file; only valid with a single input
    #[arg(long)]
    output: Option<PathBuf>,

    /// Maximum concurrent conversions (default: one per CPU)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Give up on a single file after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log filter when RUST_LOG is unset (e.g. "info", "webp_converter_lib=debug")
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn progress_bar(total: usize, hidden: bool) -> anyhow::Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

fn render(bar: &ProgressBar, event: Progress) {
    match event.progress_type {
        ProgressType::Start => bar.set_message(event.status),
        ProgressType::Progress | ProgressType::Error => {
            bar.set_position(event.completed_tasks as u64);
            if let Some(result) = &event.result {
                if let Some(reason) = result.reason() {
                    bar.println(format!("✗ {}: {}", result.input_path.display(), reason));
                }
            }
        }
        ProgressType::Complete => bar.finish_with_message(event.status),
    }
}

async fn run_single(cli: Cli, output: PathBuf) -> anyhow::Result<ExitCode> {
    let [input] = <[PathBuf; 1]>::try_from(cli.inputs)
        .map_err(|inputs| anyhow::anyhow!("--output takes exactly one input, got {}", inputs.len()))?;

    let result = convert_image(input, Some(output), cli.quality)
        .await
        .context("invalid conversion settings")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{result}");
    }

    Ok(if result.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Drops repeated inputs, keeping the first occurrence of each path.
fn dedupe_inputs(inputs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(inputs.len());
    inputs
        .into_iter()
        .filter(|path| {
            let fresh = seen.insert(path.clone());
            if !fresh {
                warn!("File already in list: {}", path.display());
            }
            fresh
        })
        .collect()
}

async fn run_batch(mut cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = BatchConfig::default();
    if let Some(jobs) = cli.jobs {
        if jobs == 0 {
            bail!("--jobs must be at least 1");
        }
        config = config.with_workers(jobs);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    cli.inputs = dedupe_inputs(cli.inputs);
    let state = AppState::new(config);
    let options = ConversionOptions::new(cli.quality, cli.output_dir);

    // Ctrl-C aborts the batch; files already converted are kept.
    let signal_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            signal_state.cancel_active();
        }
    });

    let bar = progress_bar(cli.inputs.len(), cli.no_progress || cli.json)?;
    let report = convert_images(&state, cli.inputs, options, |event| render(&bar, event))
        .await
        .context("batch rejected")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    debug!(
        "{} -> {} bytes in {}ms",
        report.total_input_bytes, report.total_output_bytes, report.elapsed_ms
    );

    Ok(if report.failed() == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut cli = Cli::parse();
    init_logging(&cli.log_level);

    info!("=== WebP converter starting ===");

    match cli.output.take() {
        Some(output) => run_single(cli, output).await,
        None => run_batch(cli).await,
    }
}
