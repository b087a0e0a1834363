//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Resource limits to protect against problematic uploads and captures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum decoded payload size in megabytes
    pub max_payload_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_mb: 25,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Preview (the `content` image) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Taller sources are scaled down to exactly this height
    pub max_height: u32,

    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_height: 600,
            quality: 90,
        }
    }
}

/// Square thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Edge length of the square thumbnail in pixels
    pub size: u32,

    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: 200,
            quality: 90,
        }
    }
}

/// Document export settings.
///
/// Page dimensions and the gap share one unit (millimetres by default);
/// rendering converts them to PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Sheet width
    pub page_width: f32,

    /// Sheet height
    pub page_height: f32,

    /// Allowance added to the break test between stacked captures
    pub gap: f32,

    /// Delay before captures start, in milliseconds
    pub capture_delay_ms: u64,

    /// JPEG quality for embedded captures (1-100)
    pub image_quality: u8,

    /// Where `FileSink` writes finished documents
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            gap: 20.0,
            capture_delay_ms: 500,
            image_quality: 92,
            output_dir: "~/.gites/exports".to_string(),
        }
    }
}

/// Persistent key-value storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the store
    pub path: String,

    /// Key holding the serialized auth token
    pub auth_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.gites/storage.json".to_string(),
            auth_key: "gites-jwt".to_string(),
        }
    }
}

/// Real-time channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Topic carrying locked-day broadcasts
    pub topic: String,

    /// Join uuid used by the admin app
    pub admin_uuid: String,

    /// Max messages buffered between transport and bridge
    pub buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            topic: "bookings:locked_days".to_string(),
            admin_uuid: "bookingsAdmin".to_string(),
            buffer_size: 64,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
