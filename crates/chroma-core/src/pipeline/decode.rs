//! Image decoding with content-based format detection and size limits.

use image::{ImageFormat, ImageReader, Limits};
use std::io::Cursor;
use std::path::Path;

use crate::buffer::PixelBuffer;
use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Produces pixel buffers from input paths.
///
/// Implementations run on blocking worker threads and must be shareable
/// across them.
pub trait ImageSource: Send + Sync {
    fn decode(&self, path: &Path) -> PipelineResult<PixelBuffer>;
}

/// Decoder backed by the `image` crate.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory file. `path` is only used for error context and
    /// as a format fallback when the content is not recognized.
    ///
    /// Dimensions are read from the header first, so an oversized image is
    /// rejected before any pixel data is decoded.
    pub fn decode_bytes(&self, bytes: Vec<u8>, path: &Path) -> PipelineResult<PixelBuffer> {
        let (width, height) = Self::reader(&bytes, path)?
            .into_dimensions()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim,
            });
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(max_dim);
        limits.max_image_height = Some(max_dim);
        let mut reader = Self::reader(&bytes, path)?;
        reader.limits(limits);

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        PixelBuffer::try_from(image.into_rgb8()).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reader with the format sniffed from content, falling back to the
    /// file extension.
    fn reader<'a>(bytes: &'a [u8], path: &Path) -> PipelineResult<ImageReader<Cursor<&'a [u8]>>> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        if reader.format().is_none() {
            let format =
                ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })?;
            reader.set_format(format);
        }
        Ok(reader)
    }
}

impl ImageSource for ImageDecoder {
    fn decode(&self, path: &Path) -> PipelineResult<PixelBuffer> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            },
        })?;
        tracing::trace!("Read {} bytes from {:?}", bytes.len(), path);
        self.decode_bytes(bytes, path)
    }
}
