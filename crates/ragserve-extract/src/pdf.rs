//! PDF content extractor.
//!
//! Uses `pdf-extract` for the text layer. Extraction is CPU-bound and
//! blocking, so it runs on the blocking thread pool.

use async_trait::async_trait;
use ragserve_core::{ContentExtractor, ExtractError, ExtractedContent};
use std::path::Path;
use tracing::debug;

/// Extractor for PDF files.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for PdfExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        debug!("extracting PDF: {:?}", path);

        let bytes = tokio::fs::read(path).await?;

        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractError::Parse(format!("extraction task failed: {e}")))?
        .map_err(ExtractError::Parse)?;

        // pdf-extract renders page breaks as form feeds
        let page_count = text.matches('\u{c}').count() as u32 + 1;

        Ok(ExtractedContent {
            text,
            page_count: Some(page_count),
        })
    }
}
