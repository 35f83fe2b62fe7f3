//! Factory for creating extractors.

use std::sync::Arc;

use crate::{Extractor, HtmlExtractor, MarkdownExtractor, RtfExtractor, SvgExtractor};

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "docx")]
use crate::DocxExtractor;

#[cfg(feature = "office")]
use crate::{EpubExtractor, OdtExtractor, PptxExtractor, SpreadsheetExtractor};

#[cfg(feature = "ocr")]
use crate::image::{ImageExtractor, OcrConfig};

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create an HTML extractor.
    pub fn html() -> Arc<dyn Extractor> {
        Arc::new(HtmlExtractor::new())
    }

    /// Create a Markdown extractor.
    pub fn markdown() -> Arc<dyn Extractor> {
        Arc::new(MarkdownExtractor::new())
    }

    /// Create an RTF extractor.
    pub fn rtf() -> Arc<dyn Extractor> {
        Arc::new(RtfExtractor::new())
    }

    /// Create an SVG extractor.
    pub fn svg() -> Arc<dyn Extractor> {
        Arc::new(SvgExtractor::new())
    }

    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::new())
    }

    /// Create a PDF extractor with custom minimum text threshold.
    #[cfg(feature = "pdf")]
    pub fn pdf_with_threshold(min_text_length: usize) -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::with_min_text_length(min_text_length))
    }

    /// Create a DOCX extractor.
    #[cfg(feature = "docx")]
    pub fn docx() -> Arc<dyn Extractor> {
        Arc::new(DocxExtractor::new())
    }

    /// Create a DOCX extractor with custom configuration.
    #[cfg(feature = "docx")]
    pub fn docx_configured(preserve_tables: bool, extract_headings: bool) -> Arc<dyn Extractor> {
        Arc::new(
            DocxExtractor::new()
                .with_tables(preserve_tables)
                .with_headings(extract_headings),
        )
    }

    /// Create a PPTX extractor.
    #[cfg(feature = "office")]
    pub fn pptx() -> Arc<dyn Extractor> {
        Arc::new(PptxExtractor::new())
    }

    /// Create an ODT extractor.
    #[cfg(feature = "office")]
    pub fn odt() -> Arc<dyn Extractor> {
        Arc::new(OdtExtractor::new())
    }

    /// Create an EPUB extractor.
    #[cfg(feature = "office")]
    pub fn epub() -> Arc<dyn Extractor> {
        Arc::new(EpubExtractor::new())
    }

    /// Create an XLSX/XLSM extractor.
    #[cfg(feature = "office")]
    pub fn spreadsheet() -> Arc<dyn Extractor> {
        Arc::new(SpreadsheetExtractor::new())
    }

    /// Create an OCR image extractor.
    #[cfg(feature = "ocr")]
    pub fn image() -> Arc<dyn Extractor> {
        Arc::new(ImageExtractor::new())
    }

    /// Create an OCR image extractor with custom settings.
    #[cfg(feature = "ocr")]
    pub fn image_with_config(config: OcrConfig) -> Arc<dyn Extractor> {
        Arc::new(ImageExtractor::with_config(config))
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();

        extractors.push(Self::html());
        extractors.push(Self::markdown());
        extractors.push(Self::rtf());
        extractors.push(Self::svg());

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "docx")]
        extractors.push(Self::docx());

        #[cfg(feature = "office")]
        {
            extractors.push(Self::pptx());
            extractors.push(Self::odt());
            extractors.push(Self::epub());
            extractors.push(Self::spreadsheet());
        }

        #[cfg(feature = "ocr")]
        extractors.push(Self::image());

        extractors
    }
}
