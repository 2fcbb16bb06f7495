//! In-memory RGB raster shared by every transform.
//!
//! Pixels are stored row-major as packed `[r, g, b]` bytes, the same layout
//! as `image::RgbImage`, so conversion in either direction is a move of the
//! underlying `Vec<u8>`.

use image::{Rgb, RgbImage};

use crate::error::BufferError;

/// A width × height raster of 24-bit RGB pixels.
///
/// Width and height are always positive and the store always holds exactly
/// `width * height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Clamp an integer channel value into `0..=255`.
#[inline]
pub fn clamp(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

impl PixelBuffer {
    /// Create an all-black buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        Ok(Self::blank(width, height))
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: Rgb<u8>) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        let data = color.0.repeat(width as usize * height as usize);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw row-major RGB bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(BufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Black buffer for transform outputs. Callers guarantee non-zero dimensions.
    pub(crate) fn blank(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (width × height).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Read the pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgb<u8>, BufferError> {
        self.check_bounds(x, y)?;
        Ok(self.at(x, y))
    }

    /// Overwrite the pixel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, color: Rgb<u8>) -> Result<(), BufferError> {
        self.check_bounds(x, y)?;
        self.put(x, y, color);
        Ok(())
    }

    /// Unchecked-by-contract read used by the kernels once coordinates are
    /// known to be in range. Out-of-range coordinates are a bug and panic.
    #[inline]
    pub(crate) fn at(&self, x: u32, y: u32) -> Rgb<u8> {
        let i = self.offset(x, y);
        Rgb([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    #[inline]
    pub(crate) fn put(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&color.0);
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb<u8>> + '_ {
        self.data.chunks_exact(3).map(|p| Rgb([p[0], p[1], p[2]]))
    }

    /// Build a same-sized buffer by mapping every pixel independently.
    pub fn map_pixels<F>(&self, mut f: F) -> PixelBuffer
    where
        F: FnMut(Rgb<u8>) -> Rgb<u8>,
    {
        let mut data = Vec::with_capacity(self.data.len());
        for pixel in self.pixels() {
            data.extend_from_slice(&f(pixel).0);
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Raw row-major RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Convert into an `image::RgbImage` without copying.
    pub fn into_rgb_image(self) -> RgbImage {
        // Length is an invariant of PixelBuffer, so from_raw cannot fail here.
        RgbImage::from_raw(self.width, self.height, self.data)
            .unwrap_or_else(|| RgbImage::new(0, 0))
    }

    /// Copy into an `image::RgbImage`.
    pub fn to_rgb_image(&self) -> RgbImage {
        self.clone().into_rgb_image()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), BufferError> {
        if x >= self.width || y >= self.height {
            return Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl TryFrom<RgbImage> for PixelBuffer {
    type Error = BufferError;

    fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions { width, height });
    }
    Ok(())
}
