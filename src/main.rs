use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use retro_vhs::{
    config::EngineConfig,
    render::RenderJob,
    vhs::{random_preset, VhsConfig, VhsEngine},
};

#[derive(Parser)]
#[command(
    name = "retro-vhs",
    version,
    about = "Apply composite video and VHS tape artifacts to images",
    long_about = "Retro-VHS degrades still frames or numbered frame sequences the way an NTSC composite signal and a consumer VCR would."
)]
struct Cli {
    /// Input image (PNG, JPEG) or directory of frames
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output image, or output directory for a frame sequence
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON parameter set, as written by --export-params
    #[arg(short, long, conflicts_with = "preset")]
    params: Option<PathBuf>,

    /// Use a random parameter set generated from this seed
    #[arg(long)]
    preset: Option<u64>,

    /// Write the effective parameter set as JSON
    #[arg(long)]
    export_params: Option<PathBuf>,

    /// Output height in rows
    #[arg(long)]
    height: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    info!("Starting Retro-VHS v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            EngineConfig::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            EngineConfig::default()
        }
    };

    if let Some(seed) = cli.preset {
        info!("Using random preset {}", seed);
        config.vhs = random_preset(seed, config.engine.random);
    }
    if let Some(params_path) = &cli.params {
        let text = std::fs::read_to_string(params_path)
            .with_context(|| format!("reading parameters from {:?}", params_path))?;
        config.vhs = VhsConfig::from_json_str(&text).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    if let Some(height) = cli.height {
        config.render.height = height;
    }
    config.validate()?;

    if let Some(export_path) = &cli.export_params {
        std::fs::write(export_path, config.vhs.to_json_string()?)?;
        info!("Parameters written to {:?}", export_path);
    }

    let Some(input) = cli.input else {
        if cli.export_params.is_some() {
            return Ok(());
        }
        bail!("--input is required unless only exporting parameters");
    };
    let Some(output) = cli.output else {
        bail!("--output is required");
    };

    let engine = VhsEngine::from_settings(config.vhs, &config.engine);
    let job = RenderJob::new(config.render);

    if input.is_dir() {
        let (_, summary) = job.run(engine, input, output.clone()).await?;
        info!("Rendered {} of {} frames into {:?}", summary.frames_out, summary.frames_in, output);
    } else {
        let mut engine = engine;
        job.render_image(&mut engine, &input, &output)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    Ok(())
}
