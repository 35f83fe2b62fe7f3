//! Image text extraction via Tesseract OCR.
//!
//! Images are decoded with the `image` crate (which also validates the
//! file), converted to grayscale and handed to Tesseract through
//! rusty-tesseract. Requires the `tesseract` binary on the host.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use rusty_tesseract::{Args, Image};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ContentSource, ExtractedContent, Modality};
use crate::{read_source, Extractor};

/// Tesseract invocation settings.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code (default: `eng`).
    pub language: String,
    /// Keep runs of spaces between words instead of collapsing them.
    pub preserve_interword_spaces: bool,
    /// Page segmentation mode passed as `--psm`.
    pub psm: Option<i32>,
    /// Resolution hint passed as `--dpi`.
    pub dpi: Option<i32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            preserve_interword_spaces: true,
            psm: Some(3),
            dpi: Some(150),
        }
    }
}

impl OcrConfig {
    fn to_args(&self) -> Args {
        let mut config_variables = HashMap::new();
        if self.preserve_interword_spaces {
            config_variables.insert("preserve_interword_spaces".to_string(), "1".to_string());
        }
        Args {
            lang: self.language.clone(),
            config_variables,
            dpi: self.dpi,
            psm: self.psm,
            ..Args::default()
        }
    }
}

/// OCR extractor for raster images.
#[derive(Debug, Clone, Default)]
pub struct ImageExtractor {
    config: OcrConfig,
}

impl ImageExtractor {
    /// Create image extractor with default OCR settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create image extractor with custom OCR settings.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn ocr_sync(content: Vec<u8>, args: Args) -> ExtractResult<(String, String, u32, u32)> {
        let format = image::guess_format(&content)
            .map_err(|e| ExtractError::malformed("image", e.to_string()))?;
        let decoded = image::load_from_memory_with_format(&content, format)
            .map_err(|e| ExtractError::malformed("image", e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());

        let gray = image::DynamicImage::ImageLuma8(decoded.to_luma8());
        let tesseract_image =
            Image::from_dynamic_image(&gray).map_err(|e| ExtractError::Ocr(e.to_string()))?;
        let text = rusty_tesseract::image_to_string(&tesseract_image, &args)
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        Ok((
            text,
            format!("{:?}", format).to_lowercase(),
            width,
            height,
        ))
    }
}

#[async_trait]
impl Extractor for ImageExtractor {
    async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let content = read_source(path).await?;
        let args = self.config.to_args();

        let (raw, format, width, height) =
            tokio::task::spawn_blocking(move || Self::ocr_sync(content, args)).await??;
        let text = raw.trim().to_string();
        debug!(
            path = %path.display(),
            format = %format,
            width,
            height,
            chars = text.len(),
            "OCR completed"
        );

        Ok(
            ExtractedContent::new(text, Modality::Image { format }, ContentSource::path(path))
                .with_metadata("width", width)
                .with_metadata("height", height)
                .with_metadata("ocr_language", self.config.language.clone()),
        )
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp"]
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extractor_extensions() {
        let extractor = ImageExtractor::new();
        assert_eq!(extractor.name(), "tesseract");
        for ext in ["PNG", ".jpg", "jpeg", ".tif", ".tiff", ".webp", ".gif", ".bmp"] {
            assert!(extractor.supports(ext), "{ext} should be supported");
        }
        assert!(!extractor.supports(".svg"));
    }

    #[test]
    fn test_ocr_args() {
        let args = OcrConfig::default().to_args();
        assert_eq!(args.lang, "eng");
        assert_eq!(
            args.config_variables.get("preserve_interword_spaces").map(String::as_str),
            Some("1")
        );

        let args = OcrConfig {
            language: "deu".to_string(),
            preserve_interword_spaces: false,
            ..OcrConfig::default()
        }
        .to_args();
        assert_eq!(args.lang, "deu");
        assert!(args.config_variables.is_empty());
    }

    #[tokio::test]
    async fn test_image_invalid_content() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), b"definitely not an image").unwrap();

        let result = ImageExtractor::new().extract(file.path()).await;
        assert!(matches!(result, Err(ExtractError::Malformed { format: "image", .. })));
    }
}
