//! Plain text and markdown extractor.

use async_trait::async_trait;
use ragserve_core::{ContentExtractor, ExtractError, ExtractedContent};
use std::path::Path;
use tokio::fs;

/// Extractor for UTF-8 text files (`.txt`, `.md`).
///
/// Markdown is treated as plain text; the splitter's paragraph-first break
/// preference already keeps headings and paragraphs together well enough for
/// retrieval.
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new text extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for TextExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let text = fs::read_to_string(path).await?;
        Ok(ExtractedContent::text_only(text))
    }
}
