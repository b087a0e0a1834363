//! Core data types exchanged with the UI.
//!
//! Field names follow the UI's JSON conventions (`imageData`), so these types
//! serialize straight onto the port payloads.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

/// An uploaded image waiting to be normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    /// Name of the uploaded file, echoed back in the result
    pub filename: String,

    /// `data:<mime>;base64,<payload>` URI
    pub image_data: String,
}

impl ImageRequest {
    /// Build a request from raw file bytes, sniffing the MIME type from content.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let media_type = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        Self {
            filename: filename.into(),
            image_data: format!("data:{};base64,{}", media_type, BASE64.encode(bytes)),
        }
    }
}

/// The normalized form of an upload: bounded preview plus square thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Filename from the request
    pub filename: String,

    /// Preview as a JPEG data URI
    pub content: String,

    /// 200x200 thumbnail as a JPEG data URI
    pub thumb: String,

    /// Estimated byte size of `content`
    pub size: u64,

    /// Preview width in pixels
    pub width: u32,

    /// Preview height in pixels
    pub height: u32,
}

/// Identifier of a group of on-screen elements to export together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a single file-name component, for capture directories and
    /// exported file names.
    pub fn as_path_component(&self) -> Result<&str, PipelineError> {
        let invalid = |message: &str| PipelineError::InvalidGroup {
            group: self.0.clone(),
            message: message.to_string(),
        };

        if self.0.is_empty() {
            return Err(invalid("group id is empty"));
        }
        if self.0 == "." || self.0 == ".." || self.0.contains(['/', '\\']) {
            return Err(invalid("group id must not contain path separators"));
        }
        Ok(&self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A finished multi-page document.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Group the document was built from
    pub group: GroupId,

    /// Number of sheets in the document (at least one)
    pub page_count: usize,

    /// Number of captures placed
    pub element_count: usize,

    /// Complete PDF file
    pub bytes: Vec<u8>,
}
