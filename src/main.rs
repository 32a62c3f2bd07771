//! `logo-enhance` CLI - Download, upscale and sharpen an image.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logo_enhance::image::{DEFAULT_QUALITY, DEFAULT_SCALE_FACTOR, DEFAULT_SHARPNESS};
use logo_enhance::pipeline::{DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_URL};
use logo_enhance::{Config, OutputFormat, Pipeline};

/// Download an image, upscale it with Lanczos resampling, sharpen it and save it.
#[derive(Parser, Debug)]
#[command(name = "logo-enhance")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image URL to download.
    #[arg(long, default_value = DEFAULT_SOURCE_URL, value_name = "URL")]
    url: String,

    /// Output image path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, value_name = "PATH")]
    output: PathBuf,

    /// Scratch path for the download. Defaults to temp_logo.png next to the output.
    #[arg(long, value_name = "PATH")]
    temp: Option<PathBuf>,

    /// Upscale factor for width and height.
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR, value_name = "INT")]
    scale: u32,

    /// Sharpness factor. 1.0 leaves the image unchanged.
    #[arg(long, default_value_t = DEFAULT_SHARPNESS, value_name = "FLOAT")]
    sharpness: f32,

    /// Encoder quality (1-100).
    #[arg(short, long, default_value_t = DEFAULT_QUALITY, value_name = "INT")]
    quality: u8,

    /// Output format (png or jpeg).
    #[arg(long, default_value = "png", value_name = "FORMAT")]
    format: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("logo_enhance={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::for_output(args.output);
    if let Some(temp) = args.temp {
        config.temp_path = temp;
    }
    config.source_url = args.url;
    config.scale_factor = args.scale;
    config.sharpness = args.sharpness;
    config.output_quality = args.quality;
    config.output_format = args.format;

    let pipeline = Pipeline::new(config).context("Failed to initialize pipeline")?;

    let report = pipeline.run().context("Failed to enhance image")?;

    println!("{report}");

    Ok(())
}
