//! Height-bounded preview scaling.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;

use crate::config::PreviewConfig;

/// Scales uploads down to the configured maximum height.
pub struct PreviewScaler {
    config: PreviewConfig,
}

impl PreviewScaler {
    /// Create a new scaler with the given configuration.
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Preview dimensions for a source of `width` x `height`.
    ///
    /// Sources taller than `max_height` are scaled to exactly that height with
    /// the width following proportionally; smaller ones are never upscaled.
    pub fn dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_height = self.config.max_height;
        if height > max_height {
            let scaled = (width as f64 * max_height as f64 / height as f64).round();
            ((scaled as u32).max(1), max_height)
        } else {
            (width, height)
        }
    }

    /// Render the preview, borrowing the source when no scaling is needed.
    pub fn render<'a>(&self, image: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        let (src_w, src_h) = image.dimensions();
        let (width, height) = self.dimensions(src_w, src_h);
        if (width, height) == (src_w, src_h) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(image.resize_exact(width, height, FilterType::Triangle))
        }
    }

    /// JPEG quality for the encoded preview.
    pub fn quality(&self) -> u8 {
        self.config.quality
    }
}
