//! Batch pipeline stages.
//!
//! - **discovery**: find image files in the input directory
//! - **decode**: read files into pixel buffers
//! - **encode**: write transformed buffers to the output directory
//! - **runner**: bounded worker pool tying the stages together

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod runner;

pub use decode::{ImageDecoder, ImageSource};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::{ImageSink, ImageWriter, OutputFormat};
pub use runner::{BatchRunner, DEFAULT_WORKERS};
