//! Upload normalization - wires decode, preview, thumbnail and encode together.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{ImageRequest, ImageResult};

use super::decode::ImageDecoder;
use super::encode::{encode_jpeg_data_uri, estimate_size};
use super::preview::PreviewScaler;
use super::thumbnail::ThumbnailGenerator;

/// Turns uploaded images into a bounded preview and a square thumbnail.
///
/// Stateless between calls; each call owns its buffers, so one normalizer can
/// serve concurrent uploads.
pub struct ImageNormalizer {
    decoder: ImageDecoder,
    renderers: Arc<Renderers>,
}

struct Renderers {
    preview: PreviewScaler,
    thumbnail: ThumbnailGenerator,
}

impl ImageNormalizer {
    /// Create a new normalizer with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            renderers: Arc::new(Renderers {
                preview: PreviewScaler::new(config.preview.clone()),
                thumbnail: ThumbnailGenerator::new(config.thumbnail.clone()),
            }),
        }
    }

    /// Normalize a single upload.
    pub async fn normalize(&self, request: &ImageRequest) -> Result<ImageResult, PipelineError> {
        let start = Instant::now();
        tracing::debug!("Normalizing: {}", request.filename);

        let decoded = self
            .decoder
            .decode_data_uri(&request.filename, &request.image_data)
            .await?;
        tracing::trace!("  Decode: {:?}", start.elapsed());

        let renderers = Arc::clone(&self.renderers);
        let filename = request.filename.clone();
        let render_start = Instant::now();

        let rendered = tokio::task::spawn_blocking(move || {
            let encode_err = |e: image::ImageError| PipelineError::Encode {
                filename: filename.clone(),
                message: e.to_string(),
            };

            let preview = renderers.preview.render(&decoded.image);
            let content = encode_jpeg_data_uri(&preview, renderers.preview.quality())
                .map_err(encode_err)?;

            let thumb = renderers.thumbnail.generate(&decoded.image);
            let thumb = encode_jpeg_data_uri(&thumb, renderers.thumbnail.quality())
                .map_err(encode_err)?;

            Ok::<_, PipelineError>((content, thumb, preview.width(), preview.height()))
        })
        .await
        .map_err(|e| PipelineError::Encode {
            filename: request.filename.clone(),
            message: format!("Task join error: {}", e),
        })??;
        tracing::trace!("  Render: {:?}", render_start.elapsed());

        let (content, thumb, width, height) = rendered;
        let size = estimate_size(&content);

        tracing::debug!(
            "Normalized {} in {:?} ({}x{}, ~{} bytes)",
            request.filename,
            start.elapsed(),
            width,
            height,
            size
        );

        Ok(ImageResult {
            filename: request.filename.clone(),
            content,
            thumb,
            size,
            width,
            height,
        })
    }
}
