//! Geometric transforms: rotation about the image center and resampling.

use image::imageops::{self, FilterType};

use crate::buffer::PixelBuffer;

/// Canvas size that holds the source rotated by `degrees`.
///
/// `w' = ⌊|w·cos θ|⌋ + ⌊|h·sin θ|⌋` and `h' = ⌊|w·sin θ|⌋ + ⌊|h·cos θ|⌋`,
/// never smaller than 1×1.
pub fn rotated_dimensions(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);
    let new_width = (w * cos).abs().floor() + (h * sin).abs().floor();
    let new_height = (w * sin).abs().floor() + (h * cos).abs().floor();
    ((new_width as u32).max(1), (new_height as u32).max(1))
}

/// Rotate clockwise by `degrees` about the image center.
///
/// The source is centered on the new canvas (offset truncated toward zero)
/// and sampled nearest-neighbour at each output pixel center. Canvas pixels
/// the rotated source does not cover stay black.
pub fn rotate(src: &PixelBuffer, degrees: f64) -> PixelBuffer {
    let (width, height) = src.dimensions();
    let (new_width, new_height) = rotated_dimensions(width, height, degrees);
    let mut out = PixelBuffer::blank(new_width, new_height);

    let (sin, cos) = degrees.to_radians().sin_cos();
    let offset_x = ((new_width as i64 - width as i64) / 2) as f64;
    let offset_y = ((new_height as i64 - height as i64) / 2) as f64;
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);

    for dy in 0..new_height {
        for dx in 0..new_width {
            let px = dx as f64 + 0.5 - offset_x - cx;
            let py = dy as f64 + 0.5 - offset_y - cy;
            // Inverse of the y-down clockwise rotation.
            let sx = (cos * px + sin * py + cx).floor();
            let sy = (-sin * px + cos * py + cy).floor();
            if sx < 0.0 || sy < 0.0 || sx >= width as f64 || sy >= height as f64 {
                continue;
            }
            out.put(dx, dy, src.at(sx as u32, sy as u32));
        }
    }

    out
}

/// Largest accepted scale multiplier.
pub const MAX_SCALE_FACTOR: f64 = 16.0;

/// Target size of [`scale`]: `⌊w·factor⌋ × ⌊h·factor⌋`, never smaller than
/// 1×1. Results past `u32::MAX` saturate.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let new_width = ((width as f64 * factor).floor() as u32).max(1);
    let new_height = ((height as f64 * factor).floor() as u32).max(1);
    (new_width, new_height)
}

/// Resize by `factor` with a bilinear (triangle) filter.
///
/// Callers bound the target size; see [`scaled_dimensions`].
pub fn scale(src: &PixelBuffer, factor: f64) -> PixelBuffer {
    let (width, height) = src.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, factor);

    if (new_width, new_height) == (width, height) {
        return src.clone();
    }

    let resized = imageops::resize(
        &src.to_rgb_image(),
        new_width,
        new_height,
        FilterType::Triangle,
    );
    let mut out = PixelBuffer::blank(new_width, new_height);
    out.as_raw_mut().copy_from_slice(resized.as_raw());
    out
}
