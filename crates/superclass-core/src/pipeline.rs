//! Extract-then-classify pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use superclass_extractors::{extension_of, ExtractError, ExtractorRegistry};

use crate::error::{SuperclassError, SuperclassResult};
use crate::traits::{BackendFactory, Classifier};
use crate::types::{Classification, ClassificationOptions, ModelConfig, Provider};

/// Plain-text extension read directly, without a registry lookup.
pub const PLAIN_TEXT_EXTENSION: &str = ".txt";

/// Extracted text and its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResult {
    pub text: String,
    pub classification: Classification,
}

/// Orchestrates extraction, backend construction and classification.
///
/// The pipeline holds no per-request state: every call builds its own
/// backend from the supplied provider and config, so concurrent calls
/// never share a classifier.
#[derive(Clone)]
pub struct ClassificationPipeline {
    registry: Arc<ExtractorRegistry>,
    backends: Arc<dyn BackendFactory>,
}

impl ClassificationPipeline {
    /// Create a pipeline over an extractor registry and a backend factory.
    pub fn new(registry: Arc<ExtractorRegistry>, backends: Arc<dyn BackendFactory>) -> Self {
        Self { registry, backends }
    }

    /// The extractor registry in use.
    pub fn registry(&self) -> &Arc<ExtractorRegistry> {
        &self.registry
    }

    /// Extensions this pipeline accepts, sorted: `.txt` plus every registered one.
    pub fn supported_formats(&self) -> Vec<String> {
        let mut formats = self.registry.supported_extensions();
        if !formats.iter().any(|f| f == PLAIN_TEXT_EXTENSION) {
            formats.push(PLAIN_TEXT_EXTENSION.to_string());
            formats.sort();
        }
        formats
    }

    /// Extract plain text from a file.
    ///
    /// `.txt` files are read directly; everything else goes through the
    /// extractor bound to the file's extension.
    pub async fn extract_text(&self, path: &Path) -> SuperclassResult<String> {
        let extension = extension_of(path);
        debug!(path = %path.display(), extension = %extension, "Extracting text");

        let result = if extension == PLAIN_TEXT_EXTENSION {
            tokio::fs::read(path)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|source| ExtractError::Read {
                    path: path.display().to_string(),
                    source,
                })
        } else {
            self.registry.extract(path).await.map(|content| {
                let structure = content.structure.as_ref();
                debug!(
                    path = %path.display(),
                    modality = ?content.modality,
                    page_count = ?structure.and_then(|s| s.page_count),
                    sections = structure.map_or(0, |s| s.sections.len()),
                    metadata = ?content.metadata,
                    "Extracted document"
                );
                content.into_text()
            })
        };

        result.map_err(|e| {
            error!(path = %path.display(), error = %e, "Text extraction failed");
            SuperclassError::extraction(path.display().to_string(), e)
        })
    }

    /// Build a backend for `provider` from `config`.
    pub(crate) fn backend(
        &self,
        provider: Provider,
        config: &ModelConfig,
    ) -> SuperclassResult<Box<dyn Classifier>> {
        self.backends.create(provider, config)
    }

    /// Extract and classify using the categories predefined in `config`, if any.
    pub async fn extract_and_classify(
        &self,
        path: &Path,
        provider: Provider,
        config: &ModelConfig,
    ) -> SuperclassResult<ExtractResult> {
        self.extract_and_classify_with_options(path, provider, config, &ClassificationOptions::new())
            .await
    }

    /// Extract text from `path` and classify it.
    ///
    /// Empty `options` fall back to the config's predefined categories and
    /// strict flag. Backend construction and classification failures are
    /// wrapped in [`SuperclassError::ClassificationFailed`]; nothing is
    /// retried and no partial result is returned.
    pub async fn extract_and_classify_with_options(
        &self,
        path: &Path,
        provider: Provider,
        config: &ModelConfig,
        options: &ClassificationOptions,
    ) -> SuperclassResult<ExtractResult> {
        let text = self.extract_text(path).await?;

        let fallback;
        let options = if options.is_free_form() && !config.predefined_categories.is_empty() {
            fallback = config.default_options();
            &fallback
        } else {
            options
        };

        debug!(
            path = %path.display(),
            provider = %provider,
            model = %config.model,
            text_length = text.len(),
            categories = ?options.categories(),
            "Classifying extracted text"
        );

        let classifier = self.backend(provider, config).map_err(|e| {
            error!(provider = %provider, error = %e, "Failed to create classifier");
            SuperclassError::classification_failed(e)
        })?;

        let classification = classifier
            .classify_with_options(&text, options)
            .await
            .map_err(|e| {
                error!(
                    path = %path.display(),
                    provider = %provider,
                    code = %e.code(),
                    error = %e,
                    "Classification failed"
                );
                SuperclassError::classification_failed(e)
            })?;

        info!(
            path = %path.display(),
            category = %classification.category,
            confidence = classification.confidence,
            "Classified document"
        );

        Ok(ExtractResult {
            text,
            classification,
        })
    }
}
