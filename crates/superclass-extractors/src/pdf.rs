//! PDF content extraction using pdf-extract.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, DocumentStructure, ExtractedContent, Modality};
use crate::{read_source, Extractor};

/// PDF content extractor using pdf-extract library.
///
/// Wraps synchronous pdf-extract calls in spawn_blocking to avoid blocking
/// the async runtime. Pages are split on form feeds emitted by pdf-extract.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// Below this many non-whitespace characters the document is flagged
    /// as likely scanned (image-only pages).
    min_text_length: usize,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor {
    /// Create new PDF extractor with default settings.
    pub fn new() -> Self {
        Self {
            min_text_length: 10,
        }
    }

    /// Create PDF extractor with custom minimum text threshold.
    pub fn with_min_text_length(min_text_length: usize) -> Self {
        Self { min_text_length }
    }

    fn extract_sync(content: Vec<u8>) -> ExtractResult<String> {
        pdf_extract::extract_text_from_mem(&content)
            .map_err(|e| ExtractError::malformed("PDF", e.to_string()))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let content = read_source(path).await?;
        let size = content.len();

        let raw = tokio::task::spawn_blocking(move || Self::extract_sync(content)).await??;

        let pages: Vec<String> = raw
            .split('\u{c}')
            .map(|page| page.trim().to_string())
            .collect();
        let pages: Vec<String> = match pages.iter().rposition(|p| !p.is_empty()) {
            Some(last) => pages.into_iter().take(last + 1).collect(),
            None => Vec::new(),
        };
        let text = pages
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");

        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        let likely_scanned = visible < self.min_text_length;
        if likely_scanned {
            warn!(
                path = %path.display(),
                visible,
                threshold = self.min_text_length,
                "PDF has little extractable text; it may be image-based"
            );
        }
        debug!(path = %path.display(), size, pages = pages.len(), "Extracted PDF text");

        Ok(ExtractedContent::new(text, Modality::Pdf, ContentSource::path(path))
            .with_structure(DocumentStructure {
                page_count: Some(pages.len()),
                sections: Vec::new(),
            })
            .with_metadata("original_size", size)
            .with_metadata("likely_scanned", likely_scanned))
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".pdf"]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_creation() {
        let extractor = PdfExtractor::new();
        assert_eq!(extractor.name(), "pdf-extract");
        assert_eq!(extractor.min_text_length, 10);
        assert!(extractor.supports(".PDF"));
        assert!(!extractor.supports(".docx"));

        let custom = PdfExtractor::with_min_text_length(50);
        assert_eq!(custom.min_text_length, 50);
    }

    #[tokio::test]
    async fn test_pdf_invalid_content() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::fs::write(file.path(), b"this is not a pdf").unwrap();

        let result = PdfExtractor::new().extract(file.path()).await;
        assert!(matches!(result, Err(ExtractError::Malformed { format: "PDF", .. })));
    }

    #[tokio::test]
    async fn test_pdf_missing_file() {
        let result = PdfExtractor::new()
            .extract(Path::new("/nonexistent/report.pdf"))
            .await;
        assert!(matches!(result, Err(ExtractError::Read { .. })));
    }
}
