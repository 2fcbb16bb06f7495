//! Error types for the Chroma transformation pipeline.
//!
//! Errors are organized by stage so a failed item can be reported with the
//! file path and the step that rejected it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Chroma operations.
#[derive(Error, Debug)]
pub enum ChromaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Pixel buffer access errors
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors (run reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-item pipeline errors, organized by stage.
///
/// None of these abort a batch: the runner records them against the item
/// and moves on.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Encoding or writing the output failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The transform task did not complete (panic in a worker)
    #[error("Transform failed for {name}: {message}")]
    Transform { name: String, message: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    /// Short stage label used in run reports and log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode { .. }
            | Self::ImageTooLarge { .. }
            | Self::UnsupportedFormat { .. }
            | Self::FileNotFound(_) => "decode",
            Self::Transform { .. } => "transform",
            Self::Encode { .. } => "encode",
        }
    }
}

/// Pixel buffer construction and access errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Coordinates outside the raster
    #[error("Pixel ({x}, {y}) out of bounds for {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Width or height is zero
    #[error("Invalid buffer dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Raw data does not match width * height * 3
    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Convenience type alias for Chroma results.
pub type Result<T> = std::result::Result<T, ChromaError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
