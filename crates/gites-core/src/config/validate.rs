//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_payload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_payload_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.preview.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "preview.max_height must be > 0".into(),
            ));
        }
        if self.thumbnail.size == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.size must be > 0".into(),
            ));
        }
        check_quality("preview.quality", self.preview.quality)?;
        check_quality("thumbnail.quality", self.thumbnail.quality)?;
        check_quality("export.image_quality", self.export.image_quality)?;
        if !(self.export.page_width > 0.0) || !(self.export.page_height > 0.0) {
            return Err(ConfigError::ValidationError(
                "export.page_width and export.page_height must be > 0".into(),
            ));
        }
        if self.export.gap < 0.0 || !self.export.gap.is_finite() {
            return Err(ConfigError::ValidationError(
                "export.gap must be >= 0".into(),
            ));
        }
        if self.channel.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "channel.buffer_size must be > 0".into(),
            ));
        }
        if self.storage.auth_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.auth_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn check_quality(field: &str, quality: u8) -> Result<(), ConfigError> {
    if quality == 0 || quality > 100 {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be between 1 and 100"
        )));
    }
    Ok(())
}
