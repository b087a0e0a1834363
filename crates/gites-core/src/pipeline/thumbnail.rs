//! Fixed-size square thumbnails cut from the source image.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::ThumbnailConfig;

/// Source rectangle of the square thumbnail crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub sx: u32,
    pub sy: u32,
    pub side: u32,
}

impl CropRect {
    /// Crop for a `width` x `height` source.
    ///
    /// Landscape sources are centred horizontally. Portrait sources start a
    /// quarter of the excess height from the top, not half.
    pub fn for_source(width: u32, height: u32) -> Self {
        let side = width.min(height);
        if width > height {
            Self {
                sx: (width - height) / 2,
                sy: 0,
                side,
            }
        } else {
            Self {
                sx: 0,
                sy: (height - width) / 4,
                side,
            }
        }
    }
}

/// Generates square thumbnails from images.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Crop the source to a square and scale it to `size` x `size`.
    pub fn generate(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let crop = CropRect::for_source(width, height);
        image
            .crop_imm(crop.sx, crop.sy, crop.side, crop.side)
            .resize_exact(self.config.size, self.config.size, FilterType::Triangle)
    }

    /// JPEG quality for the encoded thumbnail.
    pub fn quality(&self) -> u8 {
        self.config.quality
    }
}
