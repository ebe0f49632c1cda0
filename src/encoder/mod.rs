//! Image encoding: the capability the compression queue delegates to.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Detect** | `image::guess_format` |
//! | **Resize** | Lanczos3, longer edge bounded by `max_dimension` |
//! | **Encode** | JPEG / PNG / WebP encoders from the `image` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing an encoder call
//! - **Backend**: [`Encoder`] trait + [`EncodeError`]
//! - **Rust encoder**: [`RustEncoder`], the production backend

pub mod backend;
mod calculations;
mod params;
pub mod rust_encoder;

pub use backend::{EncodeError, Encoder};
pub use calculations::fit_within;
pub use params::{EncodeFormat, EncodeOptions, Quality};
pub use rust_encoder::RustEncoder;
