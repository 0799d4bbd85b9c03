use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use clap::{Args, Parser, Subcommand};
use facecrop_core::{FaceLocator, OutputSpec, ScaleFactor};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "facecrop", about = "Crop photos around the subject's eye line")]
struct Cli {
    /// SCRFD face detector model (default: <model dir>/det_10g.onnx)
    #[arg(long, global = true)]
    detector_model: Option<PathBuf>,

    /// 68-point landmark model (default: <model dir>/pfld_68.onnx)
    #[arg(long, global = true)]
    landmark_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Frame {
    /// Scale factor applied to the photo before cropping
    #[arg(short, long)]
    scale: Option<f64>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop every png/jpg/jpeg under a folder into a mirrored output tree
    Batch {
        /// Input folder
        input: PathBuf,

        /// Output folder (default: <input>/output_<YYYYMMDD>_<HHMMSS>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        frame: Frame,
    },
    /// Crop a single photo without touching the input folder
    Preview {
        /// Photo to preview
        image: PathBuf,

        /// Write the cropped result to this path
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(flatten)]
        frame: Frame,
    },
}

/// `<input>/output_<YYYYMMDD>_<HHMMSS>` for the given instant.
fn default_output_dir<Tz: TimeZone>(input: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    input.join(now.format("output_%Y%m%d_%H%M%S").to_string())
}

fn frame_settings(frame: &Frame, config: &Config) -> Result<(ScaleFactor, OutputSpec)> {
    let scale = ScaleFactor::new(frame.scale.unwrap_or(config.scale))?;
    let output = OutputSpec::new(
        frame.width.unwrap_or(config.output_width),
        frame.height.unwrap_or(config.output_height),
    )?;
    Ok((scale, output))
}

fn load_locator(cli: &Cli, config: &Config) -> Result<FaceLocator> {
    let detector = cli
        .detector_model
        .clone()
        .unwrap_or_else(|| config.detector_model_path());
    let landmarks = cli
        .landmark_model
        .clone()
        .unwrap_or_else(|| config.landmark_model_path());

    FaceLocator::load(&detector.to_string_lossy(), &landmarks.to_string_lossy())
        .context("failed to load face models")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    tracing::debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Batch {
            input,
            output,
            json,
            frame,
        } => {
            let (scale, spec) = frame_settings(frame, &config)?;
            let output_root = output
                .clone()
                .unwrap_or_else(|| default_output_dir(input, &Local::now()));
            let mut locator = load_locator(&cli, &config)?;

            let report = facecrop_core::run_batch(&mut locator, input, scale, spec, &output_root)
                .with_context(|| format!("batch over {} failed", input.display()))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
                println!(
                    "{} processed, {} failed → {}",
                    report.processed_count(),
                    report.failed_count(),
                    output_root.display()
                );
            }
        }
        Commands::Preview { image, save, frame } => {
            let (scale, spec) = frame_settings(frame, &config)?;
            let mut locator = load_locator(&cli, &config)?;

            let raster = facecrop_core::preview(&mut locator, image, scale, spec)
                .with_context(|| format!("preview of {} failed", image.display()))?;
            println!("{}: {}x{}", image.display(), raster.width(), raster.height());

            if let Some(path) = save {
                facecrop_core::compositor::save_raster(&raster, path)?;
                println!("saved to {}", path.display());
            }
        }
    }

    Ok(())
}
