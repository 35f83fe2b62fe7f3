//! superclass-extractors - File-extension keyed text extraction.
//!
//! Provides one extractor per document family behind a unified
//! trait-based interface, plus a thread-safe [`ExtractorRegistry`] that
//! binds each normalized file extension to exactly one extractor.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text extraction via pdf-extract
//! - `docx` (default) - DOCX text extraction via docx-rs
//! - `office` (default) - PPTX, ODT and EPUB (zip + XML), XLSX/XLSM via calamine
//! - `ocr` - Image OCR via tesseract (requires tesseract installed)
//! - `full` - All extraction features
//!
//! HTML, Markdown, RTF and SVG extraction are always available.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use superclass_extractors::ExtractorRegistry;
//!
//! let registry = ExtractorRegistry::with_defaults()?;
//! let extractor = registry.lookup("PDF")?;
//! let content = extractor.extract(Path::new("report.pdf")).await?;
//! ```

mod error;
mod factory;
mod html;
mod markdown;
mod registry;
mod rtf;
mod svg;
mod types;
mod xml;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

#[cfg(feature = "office")]
mod archive;

#[cfg(feature = "office")]
mod epub;

#[cfg(feature = "office")]
mod odt;

#[cfg(feature = "office")]
mod pptx;

#[cfg(feature = "office")]
mod spreadsheet;

#[cfg(feature = "ocr")]
pub mod image;

pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use html::HtmlExtractor;
pub use markdown::MarkdownExtractor;
pub use registry::{extension_of, normalize_extension, ExtractorRegistry};
pub use rtf::RtfExtractor;
pub use svg::SvgExtractor;
pub use types::{ContentSource, DocumentStructure, ExtractedContent, Modality};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "docx")]
pub use docx::DocxExtractor;

#[cfg(feature = "office")]
pub use epub::EpubExtractor;

#[cfg(feature = "office")]
pub use odt::OdtExtractor;

#[cfg(feature = "office")]
pub use pptx::PptxExtractor;

#[cfg(feature = "office")]
pub use spreadsheet::SpreadsheetExtractor;

#[cfg(feature = "ocr")]
pub use image::{ImageExtractor, OcrConfig};

use std::path::Path;

use async_trait::async_trait;

/// Core Extractor trait - every document format adapter implements this.
///
/// An extractor must not leave partial or temporary state behind when
/// extraction fails.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text content from the file at `path`.
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent>;

    /// File extensions handled by this extractor (e.g. `".pdf"`).
    ///
    /// Must be stable for the extractor's lifetime.
    fn supported_extensions(&self) -> &[&str];

    /// Check if this extractor handles the given extension, in any casing
    /// and with or without the leading dot.
    fn supports(&self, extension: &str) -> bool {
        let wanted = normalize_extension(extension);
        self.supported_extensions()
            .iter()
            .any(|ext| normalize_extension(ext) == wanted)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}

/// Read a source file, tagging failures with the offending path.
pub(crate) async fn read_source(path: &Path) -> ExtractResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| ExtractError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Read a source file as text, replacing invalid UTF-8 sequences.
pub(crate) async fn read_source_text(path: &Path) -> ExtractResult<String> {
    let bytes = read_source(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
