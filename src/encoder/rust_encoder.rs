//! Pure Rust encoder backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Detect source format | `image::guess_format` (magic bytes, not the file name) |
//! | Decode (JPEG, PNG, GIF, WebP, BMP, TIFF) | `image::load_from_memory_with_format` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3`, bounds from [`fit_within`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at `quality × 100` |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, best compression |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless; quality is ignored) |
//! | Keep source format | JPEG/PNG/WebP as above, other formats via `DynamicImage::write_to` |
//!
//! Progress is reported at fixed checkpoints: 0 (start), 30 (decoded),
//! 60 (resized), 100 (encoded).

use super::backend::{EncodeError, Encoder};
use super::calculations::fit_within;
use super::params::{EncodeOptions, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Encoder backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale down so the longer edge fits `max_dimension`. Never upscales.
fn fit(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let (new_w, new_h) = fit_within((w, h), max_dimension);
    if (new_w, new_h) == (w, h) {
        img
    } else {
        img.resize_exact(new_w, new_h, FilterType::Lanczos3)
    }
}

fn encode_failed(format: ImageFormat, err: impl std::fmt::Display) -> EncodeError {
    EncodeError::Encode {
        format: format!("{format:?}").to_lowercase(),
        message: err.to_string(),
    }
}

/// Encode into an in-memory buffer in the requested format.
fn write_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Cursor::new(Vec::new());
    let written = match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.as_percent());
            rgb.write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
        ImageFormat::WebP => {
            let pixels = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            pixels.write_with_encoder(WebPEncoder::new_lossless(&mut buf))
        }
        other => DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, other),
    };
    written.map_err(|e| encode_failed(format, e))?;
    Ok(buf.into_inner())
}

impl Encoder for RustEncoder {
    fn encode(
        &self,
        source: &[u8],
        options: &EncodeOptions,
        progress: &dyn Fn(u8),
    ) -> Result<Vec<u8>, EncodeError> {
        progress(0);
        let source_format = image::guess_format(source).map_err(|_| EncodeError::UnknownFormat)?;
        let img = image::load_from_memory_with_format(source, source_format)
            .map_err(|e| EncodeError::Decode(e.to_string()))?;
        progress(30);

        let img = fit(img, options.max_dimension);
        progress(60);

        let target = options
            .target
            .map(|t| t.image_format())
            .unwrap_or(source_format);
        let bytes = write_image(&img, target, options.quality)?;
        progress(100);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncodeFormat;
    use crate::test_helpers::{jpeg_bytes, png_bytes};
    use std::sync::Mutex;

    fn options(max_dimension: u32, target: Option<EncodeFormat>) -> EncodeOptions {
        EncodeOptions {
            max_dimension,
            quality: Quality::new(0.8),
            target,
        }
    }

    fn decode(bytes: &[u8]) -> (ImageFormat, DynamicImage) {
        let format = image::guess_format(bytes).unwrap();
        (format, image::load_from_memory(bytes).unwrap())
    }

    #[test]
    fn png_to_webp_converts_format() {
        let out = RustEncoder::new()
            .encode(
                &png_bytes(64, 48),
                &options(1920, Some(EncodeFormat::Webp)),
                &|_| {},
            )
            .unwrap();
        let (format, img) = decode(&out);
        assert_eq!(format, ImageFormat::WebP);
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn large_source_is_scaled_to_max_dimension() {
        let out = RustEncoder::new()
            .encode(
                &png_bytes(400, 200),
                &options(100, Some(EncodeFormat::Jpeg)),
                &|_| {},
            )
            .unwrap();
        let (format, img) = decode(&out);
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn original_keeps_source_format() {
        let out = RustEncoder::new()
            .encode(&jpeg_bytes(120, 80), &options(1920, None), &|_| {})
            .unwrap();
        let (format, img) = decode(&out);
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(img.dimensions(), (120, 80));
    }

    #[test]
    fn png_target_preserves_alpha() {
        let out = RustEncoder::new()
            .encode(
                &png_bytes(32, 32),
                &options(1920, Some(EncodeFormat::Png)),
                &|_| {},
            )
            .unwrap();
        let (_, img) = decode(&out);
        assert!(img.color().has_alpha());
    }

    #[test]
    fn garbage_input_is_unknown_format() {
        let result = RustEncoder::new().encode(b"not an image", &options(100, None), &|_| {});
        assert!(matches!(result, Err(EncodeError::UnknownFormat)));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(40);
        let result = RustEncoder::new().encode(&bytes, &options(100, None), &|_| {});
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn progress_checkpoints_are_reported_in_order() {
        let seen = Mutex::new(Vec::new());
        RustEncoder::new()
            .encode(
                &png_bytes(16, 16),
                &options(1920, Some(EncodeFormat::Webp)),
                &|p| seen.lock().unwrap().push(p),
            )
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 30, 60, 100]);
    }
}
