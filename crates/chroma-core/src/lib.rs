//! Chroma Core - batch image transformation library.
//!
//! Chroma applies one selected transformation to every image in a
//! directory, in parallel, and writes the results to an output directory.
//!
//! ```text
//! Discover → Decode → Transform → Encode   (per image, on a bounded pool)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use chroma_core::{Chroma, Config, Transform};
//!
//! #[tokio::main]
//! async fn main() -> chroma_core::Result<()> {
//!     let chroma = Chroma::new(Config::load()?);
//!     let report = chroma
//!         .apply("./photos".as_ref(), "./out".as_ref(), Transform::Sepia, |_| {})
//!         .await?;
//!     println!("{} written in {:?}", report.succeeded, report.elapsed);
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod transform;
pub mod types;

pub use buffer::PixelBuffer;
pub use config::Config;
pub use error::{BufferError, ChromaError, ConfigError, PipelineError, PipelineResult, Result};
pub use pipeline::{BatchRunner, DiscoveredFile, FileDiscovery, ImageSink, ImageSource};
pub use transform::{Transform, CATALOG};
pub use types::{BatchReport, FailedItem, ItemOutcome, TransformRequest, TransformResult};

use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point tying discovery and the batch runner to one configuration.
pub struct Chroma {
    config: Config,
}

impl Chroma {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Chroma v{}", VERSION);
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The transform configured by `transform.code`, if any.
    pub fn configured_transform(&self) -> Option<Transform> {
        self.config
            .transform
            .code
            .map(|code| Transform::from_code_with(code, &self.config.transform))
    }

    /// Find the images under `input` that this configuration accepts.
    pub fn discover(&self, input: &Path) -> Result<Vec<DiscoveredFile>> {
        if !input.exists() {
            return Err(PipelineError::FileNotFound(input.to_path_buf()).into());
        }
        Ok(FileDiscovery::new(self.config.processing.clone()).discover(input))
    }

    /// Apply `transform` to every image under `input`, writing to `output_dir`.
    pub async fn apply<F>(
        &self,
        input: &Path,
        output_dir: &Path,
        transform: Transform,
        on_outcome: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&ItemOutcome) + Send + Sync + 'static,
    {
        let files = self.discover(input)?;
        std::fs::create_dir_all(output_dir)?;
        let runner = BatchRunner::from_config(&self.config, transform, output_dir);
        Ok(runner.run(files, on_outcome).await)
    }
}
