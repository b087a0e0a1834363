//! Data URI parsing and image decoding with limits and timeout.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// The two halves of a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Declared MIME type (may be empty)
    pub media_type: &'a str,
    /// Base64 payload
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a data URI. Only base64-encoded URIs are accepted.
    pub fn parse(filename: &str, uri: &'a str) -> Result<Self, PipelineError> {
        let invalid = |message: &str| PipelineError::InvalidDataUri {
            filename: filename.to_string(),
            message: message.to_string(),
        };

        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing \"data:\" scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing ',' before payload"))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("payload is not base64-encoded"))?;

        Ok(Self {
            media_type,
            payload,
        })
    }

    /// Upper bound of the decoded payload size in bytes.
    pub fn decoded_len_estimate(&self) -> u64 {
        (self.payload.len() as u64 / 4 + 1) * 3
    }
}

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of the encoded input in bytes
    pub byte_len: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image carried in a data URI.
    pub async fn decode_data_uri(
        &self,
        filename: &str,
        uri: &str,
    ) -> Result<DecodedImage, PipelineError> {
        let data_uri = DataUri::parse(filename, uri)?;
        self.check_payload_size(filename, data_uri.decoded_len_estimate())?;

        let bytes = BASE64
            .decode(data_uri.payload.trim())
            .map_err(|e| PipelineError::InvalidDataUri {
                filename: filename.to_string(),
                message: format!("bad base64 payload: {}", e),
            })?;

        self.decode_from_bytes(bytes, filename).await
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    ///
    /// `label` names the image in errors (upload filename or capture path).
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        label: &str,
    ) -> Result<DecodedImage, PipelineError> {
        self.check_payload_size(label, bytes.len() as u64)?;

        let label_owned = label.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &label_owned))
                .await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        filename: label.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                filename: label.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                filename: label.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    fn check_payload_size(&self, label: &str, len: u64) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_payload_mb * 1024 * 1024;
        if len > max_bytes {
            return Err(PipelineError::PayloadTooLarge {
                filename: label.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_payload_mb,
            });
        }
        Ok(())
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, label: &str) -> Result<DecodedImage, PipelineError> {
        use std::io::Cursor;

        let byte_len = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                filename: label.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format().ok_or_else(|| PipelineError::Decode {
            filename: label.to_string(),
            message: "Unrecognized image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            filename: label.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode {
                filename: label.to_string(),
                message: "Image has no pixels".to_string(),
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            byte_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageRequest;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_parse_data_uri() {
        let uri = DataUri::parse("a.png", "data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(uri.media_type, "image/png");
        assert_eq!(uri.payload, "iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_rejects_non_data_uri() {
        let err = DataUri::parse("a.png", "https://example.com/a.png").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDataUri { .. }));
    }

    #[test]
    fn test_parse_rejects_percent_encoded_payload() {
        let err = DataUri::parse("a.svg", "data:image/svg+xml,%3Csvg%3E").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[tokio::test]
    async fn test_decode_data_uri() {
        let request = ImageRequest::from_bytes("tiny.png", &png_bytes(12, 7));
        let decoder = ImageDecoder::new(LimitsConfig::default());

        let decoded = decoder
            .decode_data_uri(&request.filename, &request.image_data)
            .await
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (12, 7));
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_decode_garbage_fails_instead_of_hanging() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder
            .decode_data_uri("junk.jpg", "data:image/jpeg;base64,aGVsbG8gd29ybGQ=")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_decode_enforces_dimension_limit() {
        let limits = LimitsConfig {
            max_image_dimension: 10,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .decode_from_bytes(png_bytes(20, 5), "wide.png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 20, .. }));
    }
}
