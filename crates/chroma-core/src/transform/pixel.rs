//! Per-pixel color operations.
//!
//! Every function reads its input and returns a freshly allocated buffer of
//! the same dimensions. Each output pixel depends only on the input pixel at
//! the same position.

use image::Rgb;
use rand::Rng;

use crate::buffer::{clamp, PixelBuffer};

/// Average the three channels: `gray = (r + g + b) / 3`.
pub fn grayscale(src: &PixelBuffer) -> PixelBuffer {
    src.map_pixels(|Rgb([r, g, b])| {
        let gray = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        Rgb([gray, gray, gray])
    })
}

/// Classic sepia matrix, truncated toward zero and capped at 255.
pub fn sepia(src: &PixelBuffer) -> PixelBuffer {
    src.map_pixels(|Rgb([r, g, b])| {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let tr = 0.393 * r + 0.769 * g + 0.189 * b;
        let tg = 0.349 * r + 0.686 * g + 0.168 * b;
        let tb = 0.272 * r + 0.534 * g + 0.131 * b;
        Rgb([clamp(tr as i64), clamp(tg as i64), clamp(tb as i64)])
    })
}

/// Invert every channel.
pub fn negative(src: &PixelBuffer) -> PixelBuffer {
    src.map_pixels(|Rgb([r, g, b])| Rgb([255 - r, 255 - g, 255 - b]))
}

/// Multiply every channel by `factor`, flooring and clamping the result.
pub fn brightness(src: &PixelBuffer, factor: f64) -> PixelBuffer {
    let scale = |c: u8| clamp((c as f64 * factor).floor() as i64);
    src.map_pixels(|Rgb([r, g, b])| Rgb([scale(r), scale(g), scale(b)]))
}

/// Add independent Gaussian noise with standard deviation `level` to every
/// channel of every pixel.
///
/// The generator is supplied by the caller so tests can seed it.
pub fn noise<R: Rng + ?Sized>(src: &PixelBuffer, level: f64, rng: &mut R) -> PixelBuffer {
    let mut jitter = |c: u8| {
        let delta = (standard_normal(rng) * level) as i64;
        clamp(c as i64 + delta)
    };
    src.map_pixels(|Rgb([r, g, b])| {
        let r = jitter(r);
        let g = jitter(g);
        let b = jitter(b);
        Rgb([r, g, b])
    })
}

/// One sample from N(0, 1) via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); keep u1 away from zero for ln().
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
