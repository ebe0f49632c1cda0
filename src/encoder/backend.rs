//! Encoder capability trait and shared error type.
//!
//! The [`Encoder`] trait is the single seam between the compression queue and
//! pixel work. The driver only ever calls `encode`, once per record, and
//! treats every error as a uniform "encoding failed" signal.
//!
//! The production implementation is
//! [`RustEncoder`](super::rust_encoder::RustEncoder). Tests plug in the
//! recording `MockEncoder` from this module's test submodule.

use super::params::EncodeOptions;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Unrecognized image data")]
    UnknownFormat,
    #[error("Failed to decode source: {0}")]
    Decode(String),
    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },
}

/// Capability interface for image encoders.
///
/// `progress` may be called any number of times with values in `0..=100`
/// while the call is in flight. Implementations must not retain it.
pub trait Encoder: Send + Sync {
    fn encode(
        &self,
        source: &[u8],
        options: &EncodeOptions,
        progress: &dyn Fn(u8),
    ) -> Result<Vec<u8>, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn encode(
        &self,
        source: &[u8],
        options: &EncodeOptions,
        progress: &dyn Fn(u8),
    ) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(source, options, progress)
    }
}

impl<E: Encoder + ?Sized> Encoder for Box<E> {
    fn encode(
        &self,
        source: &[u8],
        options: &EncodeOptions,
        progress: &dyn Fn(u8),
    ) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(source, options, progress)
    }
}
