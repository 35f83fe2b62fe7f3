//! Core types for content extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Document family the text was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Plain text content.
    #[default]
    Text,
    /// PDF document.
    Pdf,
    /// Microsoft Word document.
    Docx,
    /// Microsoft PowerPoint presentation.
    Pptx,
    /// Spreadsheet workbook (XLSX/XLSM).
    Spreadsheet,
    /// OpenDocument text.
    Odt,
    /// EPUB e-book.
    Epub,
    /// Rich Text Format.
    Rtf,
    /// HTML page.
    Html,
    /// Markdown document.
    Markdown,
    /// SVG drawing.
    Svg,
    /// Image with specified format.
    Image {
        /// Image format (e.g., "png", "jpeg").
        format: String,
    },
}

/// Source reference for original content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentSource {
    /// Content from file path.
    Path(String),
}

impl ContentSource {
    /// Reference a file on disk.
    pub fn path(path: &Path) -> Self {
        Self::Path(path.display().to_string())
    }
}

/// Document structure metadata (optional, for structured documents).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// Total page, slide or sheet count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,

    /// Extracted headings, chapter or sheet names.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sections: Vec<String>,
}

/// Extracted content with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Extracted plain text.
    pub text: String,

    /// Original content modality.
    pub modality: Modality,

    /// Document structure (if preserved).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<DocumentStructure>,

    /// Reference to original content.
    pub source: ContentSource,

    /// Additional metadata (format-specific).
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ExtractedContent {
    /// Create new extracted content.
    pub fn new(text: String, modality: Modality, source: ContentSource) -> Self {
        Self {
            text,
            modality,
            structure: None,
            source,
            metadata: HashMap::new(),
        }
    }

    /// Add structure information.
    pub fn with_structure(mut self, structure: DocumentStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Add metadata entry.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if extraction produced meaningful content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Consume the content, keeping only the text.
    pub fn into_text(self) -> String {
        self.text
    }
}
