//! Neighborhood filters: 2D convolution with a "no-op" edge policy, plus the
//! Gaussian blur and Sobel gradient-magnitude filters built on it.
//!
//! The kernels are built once per process and shared read-only by every
//! worker.

use std::sync::OnceLock;

use image::Rgb;

use crate::buffer::{clamp, PixelBuffer};

/// Binomial row used for the 5×5 Gaussian kernel.
const BINOMIAL_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

#[rustfmt::skip]
const SOBEL_X: [f32; 9] = [
    -1.0, 0.0, 1.0,
    -2.0, 0.0, 2.0,
    -1.0, 0.0, 1.0,
];

#[rustfmt::skip]
const SOBEL_Y: [f32; 9] = [
    -1.0, -2.0, -1.0,
     0.0,  0.0,  0.0,
     1.0,  2.0,  1.0,
];

/// Square convolution mask with odd side length.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// Returns `None` unless `size` is odd and `weights.len() == size * size`.
    pub fn new(size: usize, weights: Vec<f32>) -> Option<Self> {
        if size % 2 == 0 || weights.len() != size * size {
            return None;
        }
        Some(Self { size, weights })
    }

    /// Outer product `row ⊗ row`, normalized so the weights sum to 1.
    pub fn separable(row: &[f32]) -> Option<Self> {
        let sum: f32 = row.iter().sum();
        let norm = sum * sum;
        let weights = row
            .iter()
            .flat_map(|a| row.iter().map(move |b| a * b / norm))
            .collect();
        Self::new(row.len(), weights)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center to the kernel edge.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }
}

/// The 5×5 binomial approximation of a Gaussian, `{1,4,6,4,1}⊗{1,4,6,4,1}/256`.
pub fn gaussian_kernel() -> &'static Kernel {
    static KERNEL: OnceLock<Kernel> = OnceLock::new();
    KERNEL.get_or_init(|| {
        Kernel::separable(&BINOMIAL_5).unwrap_or_else(|| unreachable!("5 is odd"))
    })
}

/// Horizontal Sobel operator.
pub fn sobel_x_kernel() -> &'static Kernel {
    static KERNEL: OnceLock<Kernel> = OnceLock::new();
    KERNEL.get_or_init(|| Kernel {
        size: 3,
        weights: SOBEL_X.to_vec(),
    })
}

/// Vertical Sobel operator.
pub fn sobel_y_kernel() -> &'static Kernel {
    static KERNEL: OnceLock<Kernel> = OnceLock::new();
    KERNEL.get_or_init(|| Kernel {
        size: 3,
        weights: SOBEL_Y.to_vec(),
    })
}

/// Convolve every channel with `kernel`.
///
/// Pixels closer than the kernel radius to any edge have an incomplete
/// neighborhood and are copied from `src` unchanged. Interior sums are
/// rounded to the nearest integer and clamped to `0..=255`.
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let mut out = src.clone();
    let (width, height) = (src.width() as usize, src.height() as usize);
    let r = kernel.radius();

    if width <= 2 * r || height <= 2 * r {
        return out;
    }

    for y in r..height - r {
        for x in r..width - r {
            let mut acc = [0.0f32; 3];
            for ky in 0..kernel.size() {
                for kx in 0..kernel.size() {
                    let w = kernel.weight(kx, ky);
                    if w == 0.0 {
                        continue;
                    }
                    let Rgb(px) = src.at((x + kx - r) as u32, (y + ky - r) as u32);
                    for c in 0..3 {
                        acc[c] += w * px[c] as f32;
                    }
                }
            }
            let pixel = Rgb(acc.map(|v| clamp(v.round() as i64)));
            out.put(x as u32, y as u32, pixel);
        }
    }

    out
}

/// Repeated 5×5 Gaussian smoothing. Each pass feeds the next.
pub fn gaussian_blur(src: &PixelBuffer, passes: u32) -> PixelBuffer {
    let kernel = gaussian_kernel();
    let mut current = src.clone();
    for _ in 0..passes {
        current = convolve(&current, kernel);
    }
    current
}

/// Sobel gradient magnitude per channel.
///
/// Both directional responses are computed from the unmodified input (and are
/// therefore clamped to `0..=255` like any convolution output) before being
/// combined as `min(255, round(sqrt(gx² + gy²)))`.
pub fn edge_detect(src: &PixelBuffer) -> PixelBuffer {
    let gx = convolve(src, sobel_x_kernel());
    let gy = convolve(src, sobel_y_kernel());

    let mut out = PixelBuffer::blank(src.width(), src.height());
    for y in 0..src.height() {
        for x in 0..src.width() {
            let Rgb(a) = gx.at(x, y);
            let Rgb(b) = gy.at(x, y);
            let magnitude = |c: usize| {
                let (a, b) = (a[c] as f64, b[c] as f64);
                clamp((a * a + b * b).sqrt().round() as i64)
            };
            out.put(x, y, Rgb([magnitude(0), magnitude(1), magnitude(2)]));
        }
    }
    out
}
