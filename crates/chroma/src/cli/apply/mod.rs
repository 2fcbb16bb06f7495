//! The `chroma apply` command.

mod batch;
mod setup;

use chroma_core::Transform;
use clap::Args;
use std::path::PathBuf;

use batch::run_batch;
use setup::setup_apply;

/// Arguments for the `apply` command.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Image file or directory to transform
    #[arg(required = true)]
    pub input: PathBuf,

    /// Directory that receives the transformed images
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Transform name or code (see `chroma transforms`); prompts when omitted
    #[arg(short, long)]
    pub transform: Option<String>,

    /// Number of parallel workers (overrides config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Rotation angle in degrees, clockwise
    #[arg(long, allow_hyphen_values = true)]
    pub degrees: Option<f64>,

    /// Noise standard deviation
    #[arg(long)]
    pub noise_level: Option<f64>,

    /// Multiplier for brighten, darken or scale
    #[arg(long)]
    pub factor: Option<f64>,

    /// Output encoding: source, jpeg, png, bmp, tiff, webp
    #[arg(long)]
    pub format: Option<String>,

    /// Descend into subdirectories of the input
    #[arg(short, long)]
    pub recursive: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Transform already chosen in interactive mode.
    #[arg(skip)]
    pub preset: Option<Transform>,
}

/// Manual Default impl for building ApplyArgs outside of clap (interactive mode).
impl Default for ApplyArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            transform: None,
            parallel: None,
            degrees: None,
            noise_level: None,
            factor: None,
            format: None,
            recursive: false,
            report: None,
            preset: None,
        }
    }
}

/// Execute the apply command.
pub async fn execute(args: ApplyArgs, config: chroma_core::Config) -> anyhow::Result<()> {
    let Some(ctx) = setup_apply(&args, config)? else {
        // Transform picker was dismissed
        return Ok(());
    };

    let files = ctx.chroma.discover(&ctx.input)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", ctx.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to transform", files.len());

    run_batch(ctx, files, args.report.as_deref()).await
}
