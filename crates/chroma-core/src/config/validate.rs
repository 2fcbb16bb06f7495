//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::encode::OutputFormat;
use crate::transform::MAX_SCALE_FACTOR;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if !self.transform.rotate_degrees.is_finite() {
            return Err(ConfigError::ValidationError(
                "transform.rotate_degrees must be finite".into(),
            ));
        }
        if !(self.transform.noise_level >= 0.0 && self.transform.noise_level.is_finite()) {
            return Err(ConfigError::ValidationError(
                "transform.noise_level must be >= 0".into(),
            ));
        }
        for (key, factor) in [
            ("transform.brighten_factor", self.transform.brighten_factor),
            ("transform.darken_factor", self.transform.darken_factor),
            ("transform.scale_factor", self.transform.scale_factor),
        ] {
            if !(factor > 0.0 && factor.is_finite()) {
                return Err(ConfigError::ValidationError(format!("{key} must be > 0")));
            }
        }
        if self.transform.scale_factor > MAX_SCALE_FACTOR {
            return Err(ConfigError::ValidationError(format!(
                "transform.scale_factor must be <= {MAX_SCALE_FACTOR}"
            )));
        }
        if self.output.jpeg_quality == 0 || self.output.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format '{}' is not one of source, jpeg, png, bmp, tiff, webp",
                self.output.format
            )));
        }
        Ok(())
    }
}
