//! The transformation library and the code-to-transform dispatcher.
//!
//! A run selects exactly one [`Transform`] up front. The value is `Copy`
//! and carries its own parameters, so every worker receives it by value and
//! no transform holds per-instance state.
//!
//! | code | name        | operation                         |
//! |------|-------------|-----------------------------------|
//! | 1    | `grayscale` | channel average                   |
//! | 2    | `sepia`     | sepia tone matrix                 |
//! | 3    | `negative`  | `255 - channel`                   |
//! | 4    | `blur`      | 5×5 Gaussian, six passes          |
//! | 5    | `rotate`    | rotate 90° clockwise              |
//! | 6    | `noise`     | Gaussian noise, σ = 50            |
//! | 7    | `brighten`  | brightness ×3.0                   |
//! | 8    | `darken`    | brightness ×0.3                   |
//! | 9    | `edges`     | Sobel gradient magnitude          |
//! | –    | `scale`     | bilinear resize ×0.5 (name only)  |

pub mod convolve;
pub mod geometry;
pub mod pixel;

use rand::Rng;
use serde::Serialize;

use crate::buffer::PixelBuffer;
use crate::config::TransformConfig;

pub use convolve::{convolve, edge_detect, gaussian_blur, Kernel};
pub use geometry::{rotate, rotated_dimensions, scale, scaled_dimensions, MAX_SCALE_FACTOR};
pub use pixel::{brightness, grayscale, negative, noise, sepia};

/// One selectable transformation with its parameters bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Returns the input unchanged (unknown codes)
    Identity,
    Grayscale,
    Sepia,
    Negative,
    GaussianBlur { passes: u32 },
    Rotate { degrees: f64 },
    Noise { level: f64 },
    Brightness { factor: f64 },
    EdgeDetect,
    Scale { factor: f64 },
}

/// Menu entry describing a selectable transform.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Numeric code, if the transform has one
    pub code: Option<i64>,
    /// Name accepted on the command line
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// Every selectable transform in menu order.
pub const CATALOG: &[CatalogEntry] = &[
    entry(Some(1), "grayscale", "Convert to grayscale"),
    entry(Some(2), "sepia", "Convert to sepia"),
    entry(Some(3), "negative", "Convert to negative"),
    entry(Some(4), "blur", "Apply Gaussian blur"),
    entry(Some(5), "rotate", "Rotate 90 degrees clockwise"),
    entry(Some(6), "noise", "Add Gaussian noise"),
    entry(Some(7), "brighten", "Increase brightness"),
    entry(Some(8), "darken", "Decrease brightness"),
    entry(Some(9), "edges", "Apply edge detection"),
    entry(None, "scale", "Scale down by 50%"),
];

const fn entry(code: Option<i64>, name: &'static str, description: &'static str) -> CatalogEntry {
    CatalogEntry {
        code,
        name,
        description,
    }
}

impl Transform {
    /// Map a numeric code to a transform using the default parameters.
    ///
    /// Codes outside 1-9 yield [`Transform::Identity`].
    pub fn from_code(code: i64) -> Self {
        Self::from_code_with(code, &TransformConfig::default())
    }

    /// Map a numeric code to a transform using configured parameters.
    pub fn from_code_with(code: i64, params: &TransformConfig) -> Self {
        match code {
            1 => Self::Grayscale,
            2 => Self::Sepia,
            3 => Self::Negative,
            4 => Self::GaussianBlur {
                passes: params.blur_passes,
            },
            5 => Self::Rotate {
                degrees: params.rotate_degrees,
            },
            6 => Self::Noise {
                level: params.noise_level,
            },
            7 => Self::Brightness {
                factor: params.brighten_factor,
            },
            8 => Self::Brightness {
                factor: params.darken_factor,
            },
            9 => Self::EdgeDetect,
            other => {
                tracing::warn!("Unknown transform code {other}; images will pass through unchanged");
                Self::Identity
            }
        }
    }

    /// Look up a transform by its command-line name.
    pub fn from_name(name: &str, params: &TransformConfig) -> Option<Self> {
        let transform = match name.to_lowercase().as_str() {
            "identity" | "none" => Self::Identity,
            "grayscale" | "gray" | "grey" => Self::Grayscale,
            "sepia" => Self::Sepia,
            "negative" | "invert" => Self::Negative,
            "blur" | "gaussian-blur" => Self::GaussianBlur {
                passes: params.blur_passes,
            },
            "rotate" => Self::Rotate {
                degrees: params.rotate_degrees,
            },
            "noise" => Self::Noise {
                level: params.noise_level,
            },
            "brighten" => Self::Brightness {
                factor: params.brighten_factor,
            },
            "darken" => Self::Brightness {
                factor: params.darken_factor,
            },
            "edges" | "edge-detect" | "sobel" => Self::EdgeDetect,
            "scale" => Self::Scale {
                factor: params.scale_factor,
            },
            _ => return None,
        };
        Some(transform)
    }

    /// Parse either a numeric code or a name.
    ///
    /// Numeric input always succeeds (unknown codes pass through); an unknown
    /// name returns `None`.
    pub fn parse(selector: &str, params: &TransformConfig) -> Option<Self> {
        let selector = selector.trim();
        match selector.parse::<i64>() {
            Ok(code) => Some(Self::from_code_with(code, params)),
            Err(_) => Self::from_name(selector, params),
        }
    }

    /// Short stable name, as accepted by [`Transform::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Negative => "negative",
            Self::GaussianBlur { .. } => "blur",
            Self::Rotate { .. } => "rotate",
            Self::Noise { .. } => "noise",
            Self::Brightness { factor } if *factor < 1.0 => "darken",
            Self::Brightness { .. } => "brighten",
            Self::EdgeDetect => "edges",
            Self::Scale { .. } => "scale",
        }
    }

    /// Whether the output may differ in size from the input.
    pub fn changes_dimensions(&self) -> bool {
        matches!(self, Self::Rotate { .. } | Self::Scale { .. })
    }

    /// Size of the buffer this transform produces from a `width`×`height` input.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::Rotate { degrees } => rotated_dimensions(width, height, degrees),
            Self::Scale { factor } => scaled_dimensions(width, height, factor),
            _ => (width, height),
        }
    }

    /// Apply to one buffer. Noise draws from the thread-local generator.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        self.apply_with_rng(src, &mut rand::thread_rng())
    }

    /// Apply to one buffer with an explicit random source.
    pub fn apply_with_rng<R: Rng + ?Sized>(&self, src: &PixelBuffer, rng: &mut R) -> PixelBuffer {
        match *self {
            Self::Identity => src.clone(),
            Self::Grayscale => grayscale(src),
            Self::Sepia => sepia(src),
            Self::Negative => negative(src),
            Self::GaussianBlur { passes } => gaussian_blur(src, passes),
            Self::Rotate { degrees } => rotate(src, degrees),
            Self::Noise { level } => noise(src, level, rng),
            Self::Brightness { factor } => brightness(src, factor),
            Self::EdgeDetect => edge_detect(src),
            Self::Scale { factor } => scale(src, factor),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GaussianBlur { passes } => write!(f, "blur ({passes} passes)"),
            Self::Rotate { degrees } => write!(f, "rotate ({degrees}°)"),
            Self::Noise { level } => write!(f, "noise (σ={level})"),
            Self::Brightness { factor } => write!(f, "{} (×{factor})", self.name()),
            Self::Scale { factor } => write!(f, "scale (×{factor})"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::new(8, 6).unwrap();
        for y in 0..6 {
            for x in 0..8 {
                let v = (x * 29 + y * 53) as u8;
                buf.set(x, y, Rgb([v, v.wrapping_mul(3), 255 - v])).unwrap();
            }
        }
        buf
    }

    #[test]
    fn test_output_dimensions_match_apply() {
        let src = sample();
        for transform in [
            Transform::Sepia,
            Transform::Rotate { degrees: 90.0 },
            Transform::Rotate { degrees: 30.0 },
            Transform::Scale { factor: 0.5 },
            Transform::Scale { factor: 2.5 },
        ] {
            assert_eq!(
                transform.output_dimensions(8, 6),
                transform.apply(&src).dimensions(),
                "{transform}"
            );
        }
        assert_eq!(
            Transform::Scale { factor: 2000.0 }.output_dimensions(64, 64),
            (128_000, 128_000)
        );
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(Transform::from_code(1), Transform::Grayscale);
        assert_eq!(Transform::from_code(2), Transform::Sepia);
        assert_eq!(Transform::from_code(3), Transform::Negative);
        assert_eq!(Transform::from_code(4), Transform::GaussianBlur { passes: 6 });
        assert_eq!(Transform::from_code(5), Transform::Rotate { degrees: 90.0 });
        assert_eq!(Transform::from_code(6), Transform::Noise { level: 50.0 });
        assert_eq!(Transform::from_code(7), Transform::Brightness { factor: 3.0 });
        assert_eq!(Transform::from_code(8), Transform::Brightness { factor: 0.3 });
        assert_eq!(Transform::from_code(9), Transform::EdgeDetect);
    }

    #[test]
    fn test_unknown_code_passes_through() {
        for code in [0, 10, -1, 42] {
            assert_eq!(Transform::from_code(code), Transform::Identity);
        }
        let buf = sample();
        assert_eq!(Transform::from_code(10).apply(&buf), buf);
    }

    #[test]
    fn test_configured_parameters() {
        let params = TransformConfig {
            rotate_degrees: 180.0,
            noise_level: 5.0,
            ..TransformConfig::default()
        };
        assert_eq!(
            Transform::from_code_with(5, &params),
            Transform::Rotate { degrees: 180.0 }
        );
        assert_eq!(
            Transform::from_code_with(6, &params),
            Transform::Noise { level: 5.0 }
        );
    }

    #[test]
    fn test_parse_code_or_name() {
        let params = TransformConfig::default();
        assert_eq!(Transform::parse("9", &params), Some(Transform::EdgeDetect));
        assert_eq!(Transform::parse(" sepia ", &params), Some(Transform::Sepia));
        assert_eq!(
            Transform::parse("scale", &params),
            Some(Transform::Scale { factor: 0.5 })
        );
        assert_eq!(Transform::parse("11", &params), Some(Transform::Identity));
        assert_eq!(Transform::parse("posterize", &params), None);
    }

    #[test]
    fn test_catalog_names_round_trip() {
        let params = TransformConfig::default();
        for entry in CATALOG {
            let by_name = Transform::from_name(entry.name, &params).unwrap();
            assert_eq!(by_name.name(), entry.name);
            if let Some(code) = entry.code {
                assert_eq!(Transform::from_code(code), by_name);
            }
        }
    }

    #[test]
    fn test_all_codes_produce_consistent_buffers() {
        let buf = sample();
        let mut rng = StdRng::seed_from_u64(11);
        for code in 1..=9 {
            let t = Transform::from_code(code);
            let out = t.apply_with_rng(&buf, &mut rng);
            if !t.changes_dimensions() {
                assert_eq!(out.dimensions(), buf.dimensions(), "{t}");
            }
            assert_eq!(out.as_raw().len(), out.pixel_count() * 3, "{t}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Transform::from_code(8).to_string(), "darken (×0.3)");
        assert_eq!(Transform::from_code(1).to_string(), "grayscale");
        assert_eq!(Transform::from_code(4).to_string(), "blur (6 passes)");
    }
}
