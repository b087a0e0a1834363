//! JPEG data URI encoding and the byte-size estimate reported to the UI.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

/// Prefix of every URI produced by [`encode_jpeg_data_uri`].
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Empirical ratio between the base64 length bound and the stored size.
pub const SIZE_CORRECTION: f64 = 0.5624896334383812;

/// Encode an image as JPEG bytes at the given quality.
///
/// Alpha is dropped; JPEG has no transparency.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

/// Encode an image as a `data:image/jpeg;base64,...` URI.
pub fn encode_jpeg_data_uri(image: &DynamicImage, quality: u8) -> image::ImageResult<String> {
    let bytes = encode_jpeg(image, quality)?;
    Ok(format!("{}{}", JPEG_DATA_URI_PREFIX, BASE64.encode(bytes)))
}

/// Estimate the stored size of a JPEG data URI from its payload length alone.
///
/// `round(4 * ceil(len / 3) * SIZE_CORRECTION)` where `len` is the URI length
/// minus the fixed JPEG prefix.
pub fn estimate_size(data_uri: &str) -> u64 {
    let payload_len = data_uri.len().saturating_sub(JPEG_DATA_URI_PREFIX.len());
    let size = 4.0 * (payload_len as f64 / 3.0).ceil() * SIZE_CORRECTION;
    size.round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_size_known_lengths() {
        // 300 chars: 4 * 100 * c = 224.99 -> 225
        let uri = format!("{}{}", JPEG_DATA_URI_PREFIX, "A".repeat(300));
        assert_eq!(estimate_size(&uri), 225);

        // 301 chars rounds up to 101 groups: 4 * 101 * c = 227.24 -> 227
        let uri = format!("{}{}", JPEG_DATA_URI_PREFIX, "A".repeat(301));
        assert_eq!(estimate_size(&uri), 227);
    }

    #[test]
    fn test_estimate_size_empty_payload() {
        assert_eq!(estimate_size(JPEG_DATA_URI_PREFIX), 0);
        assert_eq!(estimate_size(""), 0);
    }

    #[test]
    fn test_estimate_size_is_deterministic() {
        let uri = format!("{}{}", JPEG_DATA_URI_PREFIX, "x".repeat(12345));
        assert_eq!(estimate_size(&uri), estimate_size(&uri.clone()));
    }

    #[test]
    fn test_encode_jpeg_data_uri() {
        let img = DynamicImage::new_rgba8(16, 9);
        let uri = encode_jpeg_data_uri(&img, 90).unwrap();
        assert!(uri.starts_with(JPEG_DATA_URI_PREFIX));

        let bytes = BASE64.decode(&uri[JPEG_DATA_URI_PREFIX.len()..]).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }
}
