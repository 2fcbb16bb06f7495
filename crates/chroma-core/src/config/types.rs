//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Size of the worker pool
    pub parallel_workers: usize,

    /// File extensions picked up from the input directory
    pub supported_formats: Vec<String>,

    /// Descend into subdirectories of the input directory
    pub recursive: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: crate::pipeline::runner::DEFAULT_WORKERS,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
                "tif".to_string(),
                "tiff".to_string(),
                "webp".to_string(),
            ],
            recursive: false,
        }
    }
}

/// Transform selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Transform code (1-9) used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Rotation angle in degrees, clockwise
    pub rotate_degrees: f64,

    /// Standard deviation of the Gaussian noise
    pub noise_level: f64,

    /// Multiplier for the "brighten" preset
    pub brighten_factor: f64,

    /// Multiplier for the "darken" preset
    pub darken_factor: f64,

    /// Resize factor for "scale"
    pub scale_factor: f64,

    /// Number of 5x5 Gaussian passes for "blur"
    pub blur_passes: u32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            code: None,
            rotate_degrees: 90.0,
            noise_level: 50.0,
            brighten_factor: 3.0,
            darken_factor: 0.3,
            scale_factor: 0.5,
            blur_passes: 6,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 10000,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// "source" keeps the input file name and format; otherwise one of
    /// "jpeg", "png", "bmp", "tiff", "webp"
    pub format: String,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "source".to_string(),
            jpeg_quality: 90,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
