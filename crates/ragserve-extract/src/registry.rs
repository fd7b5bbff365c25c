//! Extractor registry routing files to extractors by extension.

use ragserve_core::{ContentExtractor, ExtractError, ExtractedContent};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Registry of content extractors.
///
/// Routing is by file extension only; the extension allow-list is the union
/// of the registered extractors' supported extensions. Anything else is
/// rejected before the file is opened.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn ContentExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a registry with the standard extractors (text, markdown, PDF).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::TextExtractor::new());
        registry.register(crate::PdfExtractor::new());
        registry
    }

    /// Register an extractor.
    pub fn register<E: ContentExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Arc::new(extractor));
    }

    /// All extensions accepted by this registry (lowercase, no dot).
    #[must_use]
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.supported_extensions().iter().copied())
            .collect()
    }

    /// Whether a path would be accepted.
    #[must_use]
    pub fn is_supported(&self, path: &Path) -> bool {
        self.extractors.iter().any(|e| e.can_extract(path))
    }

    /// Find the extractor for a path.
    #[must_use]
    pub fn get_for_path(&self, path: &Path) -> Option<Arc<dyn ContentExtractor>> {
        self.extractors.iter().find(|e| e.can_extract(path)).cloned()
    }

    /// Extract content from a file, rejecting unsupported extensions.
    pub async fn extract(&self, path: &Path) -> Result<ExtractedContent, ExtractError> {
        let extractor = self.get_for_path(path).ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or_else(|| "(none)".to_string(), |e| format!(".{e}"));
            ExtractError::UnsupportedType(ext)
        })?;

        debug!("extracting {:?}", path);
        extractor.extract(path).await
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_empty_registry_supports_nothing() {
        let registry = ExtractorRegistry::new();
        assert!(!registry.is_supported(&PathBuf::from("a.txt")));
        assert!(registry.supported_extensions().is_empty());
    }

    #[test]
    fn test_default_registry_allow_list() {
        let registry = ExtractorRegistry::with_defaults();
        let mut extensions = registry.supported_extensions();
        extensions.sort_unstable();
        assert_eq!(extensions, vec!["md", "pdf", "txt"]);
    }

    #[test]
    fn test_is_supported_for_allowed_extensions() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(registry.is_supported(&PathBuf::from("doc.pdf")));
        assert!(registry.is_supported(&PathBuf::from("doc.txt")));
        assert!(registry.is_supported(&PathBuf::from("doc.md")));
    }

    #[test]
    fn test_is_supported_rejects_other_extensions() {
        let registry = ExtractorRegistry::with_defaults();
        assert!(!registry.is_supported(&PathBuf::from("doc.docx")));
        assert!(!registry.is_supported(&PathBuf::from("doc.html")));
        assert!(!registry.is_supported(&PathBuf::from("doc")));
    }

    #[tokio::test]
    async fn test_extract_routes_to_text_extractor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Heading\n\nBody.").unwrap();

        let registry = ExtractorRegistry::with_defaults();
        let content = registry.extract(&path).await.unwrap();
        assert_eq!(content.text, "# Heading\n\nBody.");
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_before_reading() {
        // The path does not exist; rejection must happen on extension alone.
        let registry = ExtractorRegistry::with_defaults();
        let result = registry
            .extract(Path::new("/nonexistent/report.docx"))
            .await;

        match result {
            Err(ExtractError::UnsupportedType(ext)) => assert_eq!(ext, ".docx"),
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_rejects_missing_extension() {
        let registry = ExtractorRegistry::with_defaults();
        let result = registry.extract(Path::new("/nonexistent/blob")).await;
        assert!(matches!(result, Err(ExtractError::UnsupportedType(_))));
    }
}
