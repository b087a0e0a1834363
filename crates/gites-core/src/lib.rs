//! Gites Core - services behind the gites booking and admin apps.
//!
//! The UI talks to this crate through typed ports. Three services answer
//! them:
//!
//! ```text
//! upload (data URI) → Decode → Preview (≤600px high) + Thumbnail (200²) → JPEG data URIs
//! group of elements → Capture → Greedy page layout → Multi-page PDF
//! locked-days channel ⇄ Bridge ⇄ UI ports
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use gites_core::{Config, Gites, ImageRequest};
//!
//! #[tokio::main]
//! async fn main() -> gites_core::Result<()> {
//!     let gites = Gites::new(Config::load()?);
//!     let bytes = std::fs::read("./pool.jpg")?;
//!     let result = gites
//!         .normalizer()
//!         .normalize(&ImageRequest::from_bytes("pool.jpg", &bytes))
//!         .await?;
//!     println!("{}x{} ({} bytes)", result.width, result.height, result.size);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod boot;
pub mod bridge;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod types;

use std::path::Path;
use std::sync::Arc;

pub use auth::{AuthCommand, AuthReply, AuthStorage};
pub use boot::{BootFlags, SeedInfo};
pub use bridge::{Bridge, Role, Services, UiCommand, UiMessage};
pub use config::Config;
pub use error::{
    ChannelError, ConfigError, GitesError, PipelineError, PipelineResult, Result, StorageError,
};
pub use export::{DirectorySource, DocumentExporter, DocumentSink, ElementSource, FileSink};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::ImageNormalizer;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{ExportResult, GroupId, ImageRequest, ImageResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point wiring the services from one configuration.
pub struct Gites {
    config: Config,
}

impl Gites {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing gites v{}", VERSION);
        Self { config }
    }

    /// Build an instance from the configuration file, or defaults.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Config::load()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn normalizer(&self) -> ImageNormalizer {
        ImageNormalizer::new(&self.config)
    }

    /// Exporter over groups stored as directories of captures under `root`.
    pub fn directory_exporter(&self, root: &Path) -> DocumentExporter {
        let source = DirectorySource::new(root, self.config.limits.clone());
        DocumentExporter::new(Box::new(source), self.config.export.clone())
    }

    /// Sink writing PDFs into the configured export directory.
    pub fn file_sink(&self) -> FileSink {
        FileSink::new(self.config.export_dir())
    }

    /// Auth storage over the configured JSON file.
    pub fn auth_storage(&self) -> AuthStorage<JsonFileStore> {
        AuthStorage::new(
            JsonFileStore::open(self.config.storage_path()),
            self.config.storage.auth_key.clone(),
        )
    }

    /// All bridge services, exporting from `root`.
    pub fn services(&self, root: &Path) -> Services {
        Services {
            normalizer: self.normalizer(),
            exporter: self.directory_exporter(root),
            sink: Arc::new(self.file_sink()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_gites_new() {
        let gites = Gites::new(Config::default());
        assert_eq!(gites.config().preview.max_height, 600);
        assert_eq!(gites.config().channel.topic, "bookings:locked_days");
    }

    #[test]
    fn test_file_sink_uses_export_dir() {
        let mut config = Config::default();
        config.export.output_dir = "/tmp/gites-exports".to_string();
        let gites = Gites::new(config);
        assert_eq!(gites.file_sink().dir(), Path::new("/tmp/gites-exports"));
    }
}
