//! Export orchestration: collect, capture, lay out, render.

use futures_util::future::try_join_all;
use std::time::{Duration, Instant};

use crate::config::ExportConfig;
use crate::error::PipelineError;
use crate::types::{ExportResult, GroupId};

use super::document::render_pdf;
use super::layout::{PageLayout, PageSize};
use super::source::ElementSource;

/// Builds a multi-page PDF from the captures of a group.
pub struct DocumentExporter {
    source: Box<dyn ElementSource>,
    config: ExportConfig,
}

impl DocumentExporter {
    /// Create an exporter reading elements from `source`.
    pub fn new(source: Box<dyn ElementSource>, config: ExportConfig) -> Self {
        Self { source, config }
    }

    /// Sheet size from the configuration.
    pub fn page_size(&self) -> PageSize {
        PageSize {
            width: self.config.page_width,
            height: self.config.page_height,
        }
    }

    /// Export every element of `group` into one document.
    ///
    /// An empty group yields a document with a single blank page. If any
    /// capture fails, the whole export fails.
    pub async fn export(&self, group: &GroupId) -> Result<ExportResult, PipelineError> {
        let start = Instant::now();
        let elements = self.source.collect(group).await?;
        tracing::debug!(
            "Exporting group {} from {} source: {} elements",
            group,
            self.source.name(),
            elements.len()
        );

        if !elements.is_empty() && self.config.capture_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.capture_delay_ms)).await;
        }

        let capture_start = Instant::now();
        let captures =
            try_join_all(elements.iter().map(|element| self.source.rasterize(element))).await?;
        tracing::trace!("  Capture: {:?}", capture_start.elapsed());

        let mut sizes = Vec::with_capacity(captures.len());
        for (element, capture) in elements.iter().zip(&captures) {
            if capture.width() == 0 || capture.height() == 0 {
                return Err(PipelineError::Rasterize {
                    element: element.id.clone(),
                    message: "capture is empty".to_string(),
                });
            }
            sizes.push((capture.width(), capture.height()));
        }

        let layout = PageLayout::build(&sizes, self.page_size(), self.config.gap);
        let page_count = layout.page_count;
        let element_count = captures.len();
        let quality = self.config.image_quality;

        let render_start = Instant::now();
        let id = group.to_string();
        let bytes =
            tokio::task::spawn_blocking(move || render_pdf(&id, &layout, &captures, quality))
                .await
                .map_err(|e| PipelineError::Render {
                    group: group.to_string(),
                    message: format!("Task join error: {}", e),
                })??;
        tracing::trace!("  Render: {:?}", render_start.elapsed());

        tracing::debug!(
            "Exported group {} in {:?} ({} pages, {} bytes)",
            group,
            start.elapsed(),
            page_count,
            bytes.len()
        );

        Ok(ExportResult {
            group: group.clone(),
            page_count,
            element_count,
            bytes,
        })
    }
}
