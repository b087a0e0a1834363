//! Upload normalization pipeline.
//!
//! Stages:
//! - **decode**: Parse the data URI and decode pixels under limits
//! - **preview**: Height-bounded, aspect-preserving downscale
//! - **thumbnail**: Square crop scaled to a fixed size
//! - **encode**: JPEG data URIs and the size estimate
//! - **normalizer**: Orchestrates one upload end to end

pub mod decode;
pub mod encode;
pub mod normalizer;
pub mod preview;
pub mod thumbnail;

// Re-exports for convenient access
pub use decode::{DataUri, DecodedImage, ImageDecoder};
pub use encode::{encode_jpeg, encode_jpeg_data_uri, estimate_size};
pub use normalizer::ImageNormalizer;
pub use preview::PreviewScaler;
pub use thumbnail::{CropRect, ThumbnailGenerator};
