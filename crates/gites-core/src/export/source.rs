//! Where export captures come from.
//!
//! An [`ElementSource`] lists the elements of a group in display order and
//! captures each one as a bitmap. [`DirectorySource`] backs groups with
//! directories of pre-rendered screenshots.

use async_trait::async_trait;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::pipeline::ImageDecoder;
use crate::types::GroupId;

/// Extensions `DirectorySource` treats as captures.
const CAPTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// One element of a group, as listed by its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Source-specific identifier, used in logs and errors
    pub id: String,
    /// Position in display order
    pub index: usize,
}

/// Lists and captures the elements of an export group.
///
/// Uses `async_trait` so exporters can hold a `Box<dyn ElementSource>`.
#[async_trait]
pub trait ElementSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Elements tagged with `group`, in display order. May be empty.
    async fn collect(&self, group: &GroupId) -> Result<Vec<Element>, PipelineError>;

    /// Capture one element as a bitmap.
    async fn rasterize(&self, element: &Element) -> Result<DynamicImage, PipelineError>;
}

/// Serves each group from `<root>/<group>/`, one capture per image file.
///
/// Files are ordered by path; sub-directories are not searched.
pub struct DirectorySource {
    root: PathBuf,
    decoder: ImageDecoder,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, limits: LimitsConfig) -> Self {
        Self {
            root: root.into(),
            decoder: ImageDecoder::new(limits),
        }
    }

    /// Directory holding a group's captures.
    ///
    /// Group ids must be a single plain path component.
    pub fn group_dir(&self, group: &GroupId) -> Result<PathBuf, PipelineError> {
        Ok(self.root.join(group.as_path_component()?))
    }

    fn is_capture(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                CAPTURE_EXTENSIONS.contains(&ext_lower.as_str())
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl ElementSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn collect(&self, group: &GroupId) -> Result<Vec<Element>, PipelineError> {
        let dir = self.group_dir(group)?;
        if !dir.is_dir() {
            tracing::debug!("No capture directory for group {}: {:?}", group, dir);
            return Ok(vec![]);
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && Self::is_capture(path))
            .collect();

        // Sort by path for deterministic display order
        paths.sort();

        Ok(paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Element {
                id: path.to_string_lossy().into_owned(),
                index,
            })
            .collect())
    }

    async fn rasterize(&self, element: &Element) -> Result<DynamicImage, PipelineError> {
        let bytes = tokio::fs::read(&element.id)
            .await
            .map_err(|e| PipelineError::Rasterize {
                element: element.id.clone(),
                message: e.to_string(),
            })?;

        let decoded = self
            .decoder
            .decode_from_bytes(bytes, &element.id)
            .await
            .map_err(|e| PipelineError::Rasterize {
                element: element.id.clone(),
                message: e.to_string(),
            })?;
        Ok(decoded.image)
    }
}
