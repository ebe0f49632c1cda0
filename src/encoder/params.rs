//! Parameter types for encoder calls.
//!
//! These describe *what* the encoder should produce, never *how*. The driver
//! builds an [`EncodeOptions`] from the configuration snapshot it takes when a
//! record is dequeued and hands it to whichever [`Encoder`](super::Encoder)
//! backend is plugged in.
//!
//! ## Types
//!
//! - [`Quality`]: lossy quality as a fraction in `(0, 1]`. Clamped on construction.
//! - [`EncodeFormat`]: a concrete output codec (`jpeg`, `png`, `webp`).
//! - [`EncodeOptions`]: longest-edge bound, quality, and target codec
//!   (`None` = keep the source format).

use serde::{Deserialize, Serialize};

/// Smallest quality the encoder accepts. Zero would be rejected by most codecs.
const MIN_QUALITY: f32 = 0.01;

/// Lossy encoding quality as a fraction in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(MIN_QUALITY, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale used by the JPEG encoder.
    pub fn as_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.85)
    }
}

/// A concrete codec the encoder can convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    Jpeg,
    Png,
    Webp,
}

impl EncodeFormat {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

/// Full specification for one encoder call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// Bound on the longer edge in pixels. Larger sources are scaled down.
    pub max_dimension: u32,
    pub quality: Quality,
    /// `None` keeps the source format.
    pub target: Option<EncodeFormat>,
}
