//! Encoding transformed buffers and writing them to the output directory.

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::TransformResult;

/// Persists transform results. Returns the path that was written.
pub trait ImageSink: Send + Sync {
    fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf>;
}

/// Output encoding choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Keep the input file name; encode in the format its extension names
    Source,
    Jpeg,
    Png,
    Bmp,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "source" | "same" => Some(Self::Source),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tiff" | "tif" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Source => None,
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Png => Some(ImageFormat::Png),
            Self::Bmp => Some(ImageFormat::Bmp),
            Self::Tiff => Some(ImageFormat::Tiff),
            Self::WebP => Some(ImageFormat::WebP),
        }
    }
}

/// Writes results into an output directory using the `image` encoders.
pub struct ImageWriter {
    output_dir: PathBuf,
    format: OutputFormat,
    jpeg_quality: u8,
}

impl ImageWriter {
    /// Create a writer for `output_dir`. Unknown format strings fall back to
    /// `source`; config validation rejects them before this point.
    pub fn new(output_dir: impl Into<PathBuf>, config: &OutputConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::parse(&config.format).unwrap_or(OutputFormat::Source),
            jpeg_quality: config.jpeg_quality,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the result named `name` is written, and in which format.
    pub fn target(&self, name: &str) -> PipelineResult<(PathBuf, ImageFormat)> {
        let mut path = self.output_dir.join(name);
        let format = match self.format.image_format() {
            Some(format) => {
                if let Some(ext) = format.extensions_str().first() {
                    path.set_extension(ext);
                }
                format
            }
            None => ImageFormat::from_path(&path).map_err(|e| PipelineError::Encode {
                path: path.clone(),
                message: format!("Cannot infer output format: {}", e),
            })?,
        };
        Ok((path, format))
    }

    fn encode(&self, result: &TransformResult, path: &Path, format: ImageFormat) -> PipelineResult<()> {
        let encode_err = |message: String| PipelineError::Encode {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| encode_err(format!("Cannot create directory: {}", e)))?;
        }

        let image = result.buffer.to_rgb_image();
        match format {
            ImageFormat::Jpeg => {
                let file =
                    File::create(path).map_err(|e| encode_err(format!("Cannot create file: {}", e)))?;
                let mut writer = BufWriter::new(file);
                JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality)
                    .encode_image(&image)
                    .map_err(|e| encode_err(e.to_string()))
            }
            other => image
                .save_with_format(path, other)
                .map_err(|e| encode_err(e.to_string())),
        }
    }
}

impl ImageSink for ImageWriter {
    fn write(&self, result: &TransformResult) -> PipelineResult<PathBuf> {
        let (path, format) = self.target(&result.name)?;
        self.encode(result, &path, format)?;
        tracing::trace!("Encoded {:?} as {:?}", path, format);
        Ok(path)
    }
}
