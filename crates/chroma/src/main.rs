//! Chroma CLI - apply one pixel transformation to a whole directory of images.
//!
//! # Usage
//!
//! ```bash
//! # Sepia-tone every image in ./photos
//! chroma apply ./photos -o ./out -t sepia
//!
//! # Numeric codes work too (9 = edge detection)
//! chroma apply ./photos -o ./out -t 9 --report run.json
//!
//! # Pick the transform from a menu
//! chroma apply ./photos -o ./out
//!
//! # List transforms, view configuration
//! chroma transforms
//! chroma config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Chroma - batch pixel transformations over a directory of images.
#[derive(Parser, Debug)]
#[command(name = "chroma")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a transform to every image in a directory
    Apply(cli::apply::ApplyArgs),

    /// List the available transforms and their codes
    Transforms,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match chroma_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `chroma config path`."
            );
            chroma_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Chroma v{}", chroma_core::VERSION);

    match cli.command {
        Some(Commands::Apply(args)) => cli::apply::execute(args, config).await,
        Some(Commands::Transforms) => cli::transforms::execute(&config),
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if console::user_attended_stderr() => cli::interactive::run(&config).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
