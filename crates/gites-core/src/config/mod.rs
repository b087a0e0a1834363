//! Configuration management for gites.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file only
//! overrides what it names.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource limits
    pub limits: LimitsConfig,

    /// Preview scaling and encoding
    pub preview: PreviewConfig,

    /// Square thumbnail settings
    pub thumbnail: ThumbnailConfig,

    /// Document export settings
    pub export: ExportConfig,

    /// Key-value storage settings
    pub storage: StorageConfig,

    /// Real-time channel settings
    pub channel: ChannelConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.gites.gites/config.toml
    /// - Linux: ~/.config/gites/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\gites\config\config.toml
    ///
    /// Falls back to ~/.gites/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "gites", "gites")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".gites").join("config.toml")
            })
    }

    /// Resolved storage file path (with ~ expansion).
    pub fn storage_path(&self) -> PathBuf {
        expand(&self.storage.path)
    }

    /// Resolved export output directory (with ~ expansion).
    pub fn export_dir(&self) -> PathBuf {
        expand(&self.export.output_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.preview.max_height, 600);
        assert_eq!(config.thumbnail.size, 200);
        assert_eq!(config.export.gap, 20.0);
        assert_eq!(config.storage.auth_key, "gites-jwt");
        assert_eq!(config.channel.topic, "bookings:locked_days");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[preview]"));
        assert!(toml.contains("[export]"));
        assert!(toml.contains("[channel]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[export]\npage_height = 700.0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.export.page_height, 700.0);
        assert_eq!(config.export.page_width, 210.0);
        assert_eq!(config.preview.quality, 90);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thumbnail]\nsize = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_tilde_paths_are_expanded() {
        let mut config = Config::default();
        config.storage.path = "/tmp/gites/storage.json".to_string();
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/gites/storage.json")
        );
        assert!(!config.export_dir().to_string_lossy().starts_with('~'));
    }
}
