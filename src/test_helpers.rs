//! Shared test utilities for the web-optimizer test suite.
//!
//! Provides record constructors, lookup helpers, and in-memory image
//! fixtures so unit tests don't need files on disk.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let mut registry = Registry::new();
//! registry.add([record("a.png", &png_bytes(8, 8)), record("b.jpg", b"raw")]);
//! assert_eq!(names(registry.snapshot()), ["a.png", "b.jpg"]);
//! let b = find_record(&registry, "b.jpg");
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use crate::registry::{ImageRecord, Registry};

// =========================================================================
// Records
// =========================================================================

/// A fresh `Pending` record holding a copy of `bytes`.
pub fn record(name: &str, bytes: &[u8]) -> ImageRecord {
    ImageRecord::new(name, bytes.to_vec())
}

/// Wrap a registry for sharing with a driver.
pub fn shared(registry: Registry) -> Arc<Mutex<Registry>> {
    Arc::new(Mutex::new(registry))
}

/// Record names in order.
pub fn names(records: &[ImageRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name()).collect()
}

/// Find a record by name. Panics if not found.
pub fn find_record<'a>(registry: &'a Registry, name: &str) -> &'a ImageRecord {
    registry
        .snapshot()
        .iter()
        .find(|r| r.name() == name)
        .unwrap_or_else(|| {
            let available = names(registry.snapshot());
            panic!("record '{name}' not found. Available: {available:?}")
        })
}

// =========================================================================
// Image fixtures
// =========================================================================

/// RGBA PNG with a gradient and a semi-transparent right half.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x >= width / 2 { 128 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, 96, alpha])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Baseline JPEG with a gradient.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Write `bytes` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}
