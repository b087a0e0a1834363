//! Presentation of finished documents.

use std::path::{Path, PathBuf};

use crate::error::GitesError;
use crate::types::ExportResult;

/// Receives finished documents for display or download.
pub trait DocumentSink: Send + Sync {
    /// Hand over a document; returns where it can be opened from.
    fn present(&self, document: &ExportResult) -> Result<PathBuf, GitesError>;
}

/// Writes each document to `<dir>/<group>.pdf`, replacing older exports.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for FileSink {
    fn present(&self, document: &ExportResult) -> Result<PathBuf, GitesError> {
        let name = document.group.as_path_component()?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.pdf", name));
        std::fs::write(&path, &document.bytes)?;
        tracing::info!(
            "Wrote {} ({} pages, {} captures)",
            path.display(),
            document.page_count,
            document.element_count
        );
        Ok(path)
    }
}
