//! Document feature extraction.
//!
//! A thin specialization of the classification flow: the same
//! extract, prompt and decode steps, with a richer response schema
//! describing document statistics, entities, sentiment and structure.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{SuperclassError, SuperclassResult};
use crate::pipeline::{ClassificationPipeline, ExtractResult};
use crate::response::decode_json;
use crate::traits::{Classifier, Prompt};
use crate::types::{ClassificationOptions, ModelConfig, ModelParameters, Provider};

/// Features the backend reports for a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentFeatures {
    pub word_count: u64,
    pub char_count: u64,
    pub sentence_count: u64,
    #[serde(rename = "avg_word_length")]
    pub average_word_length: f64,
    pub unique_word_count: u64,
    pub paragraph_count: u64,

    pub top_keywords: Vec<String>,
    pub named_entities: Vec<NamedEntity>,
    /// From -1.0 (negative) to 1.0 (positive).
    pub sentiment_score: f64,
    pub language_metrics: LanguageMetrics,
    pub content_structure: ContentStructure,
}

/// Entity detected in the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedEntity {
    pub text: String,
    /// PERSON, ORGANIZATION, LOCATION, etc.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageMetrics {
    pub readability_score: f64,
    pub technicality_score: f64,
    pub formality_score: f64,
    pub vocabulary_richness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStructure {
    pub heading_count: u64,
    pub list_count: u64,
    pub table_count: u64,
    pub code_block_count: u64,
    pub image_count: u64,
    pub heading_hierarchy: Vec<String>,
}

/// Classification plus features for one document.
///
/// Feature extraction runs after classification; if it fails the
/// classification is still reported and `features_error` says why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    #[serde(flatten)]
    pub result: ExtractResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<DocumentFeatures>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_error: Option<String>,
}

const FEATURE_SCHEMA: &str = r#"{
  "word_count": int,
  "char_count": int,
  "sentence_count": int,
  "avg_word_length": float,
  "unique_word_count": int,
  "paragraph_count": int,
  "top_keywords": [string],
  "named_entities": [{"text": string, "label": string}],
  "sentiment_score": float,
  "language_metrics": {
    "readability_score": float,
    "technicality_score": float,
    "formality_score": float,
    "vocabulary_richness": float
  },
  "content_structure": {
    "heading_count": int,
    "list_count": int,
    "table_count": int,
    "code_block_count": int,
    "image_count": int,
    "heading_hierarchy": [string]
  }
}"#;

/// Feature-analysis instruction tuned for each provider.
///
/// Custom backends get the OpenAI wording.
pub fn feature_instructions(provider: Provider) -> String {
    match provider {
        Provider::Anthropic => format!(
            "You are Claude, a document analysis expert. Your task is to analyze the provided text \
             and return a JSON object containing detailed features. The response must be ONLY the \
             JSON object, no other text.\n\n\
             Required JSON structure:\n{}\n\n\
             Analyze for:\n\
             1. Basic text statistics (counts, lengths)\n\
             2. Key topics and themes (keywords)\n\
             3. Named entities (people, organizations, locations)\n\
             4. Document structure (headings, lists, code blocks)\n\
             5. Language complexity and style metrics\n\
             6. Technical content indicators\n\
             7. Formality assessment\n\
             8. Sentiment (score from -1.0 to 1.0)\n\n\
             Text to analyze:",
            FEATURE_SCHEMA
        ),
        Provider::Azure => format!(
            "You are an AI language model specializing in document analysis. Extract features from \
             the provided text and return them in a specific JSON format. Return ONLY the JSON \
             object, no other text.\n\n\
             Required JSON structure:\n{}\n\n\
             Analysis criteria:\n\
             1. Text statistics (word, character, sentence counts)\n\
             2. Keywords and themes\n\
             3. Named entity recognition\n\
             4. Document structure analysis\n\
             5. Language complexity metrics\n\
             6. Technical content assessment\n\
             7. Formality level\n\
             8. Sentiment analysis (-1.0 to 1.0)\n\n\
             Text to analyze:",
            FEATURE_SCHEMA
        ),
        Provider::OpenAI | Provider::Custom => format!(
            "You are a document analysis expert. Analyze the following text and extract key \
             features. Return ONLY a JSON object with this exact structure:\n{}\n\n\
             Consider:\n\
             1. Basic text statistics\n\
             2. Key topics and themes\n\
             3. Named entities (people, organizations, locations)\n\
             4. Document structure and formatting\n\
             5. Language complexity and style\n\
             6. Technical vs non-technical content\n\
             7. Formal vs informal language\n\
             8. Sentiment analysis (score from -1.0 to 1.0)\n\n\
             Text to analyze:",
            FEATURE_SCHEMA
        ),
    }
}

/// Prompt asking `provider` to analyze `text`.
pub fn feature_prompt(provider: Provider, text: &str) -> Prompt {
    Prompt::user(format!("{}\n\n{}", feature_instructions(provider), text))
}

/// Recommended config for feature extraction: low temperature, 2000 output tokens.
pub fn default_feature_config(provider: Provider) -> ModelConfig {
    let model = match provider {
        Provider::Anthropic => "claude-3-opus-20240229",
        Provider::Azure => "gpt-4",
        Provider::OpenAI | Provider::Custom => "gpt-4-turbo-preview",
    };

    ModelConfig::new(model).with_parameters(ModelParameters {
        temperature: Some(0.1),
        max_tokens: Some(2000),
        ..Default::default()
    })
}

/// Ask an already constructed backend for the features of `text`.
pub async fn analyze_features(
    classifier: &dyn Classifier,
    text: &str,
) -> SuperclassResult<DocumentFeatures> {
    let prompt = feature_prompt(classifier.provider(), text);
    let raw = classifier.complete(&prompt).await?;
    let features: DocumentFeatures = decode_json(&raw, "feature")?;

    debug!(
        word_count = features.word_count,
        sentence_count = features.sentence_count,
        entity_count = features.named_entities.len(),
        "Feature extraction completed"
    );
    Ok(features)
}

impl ClassificationPipeline {
    /// Extract document features from `text` with a backend for `provider`.
    pub async fn extract_features(
        &self,
        text: &str,
        provider: Provider,
        config: &ModelConfig,
    ) -> SuperclassResult<DocumentFeatures> {
        debug!(
            provider = %provider,
            model = %config.model,
            content_length = text.len(),
            "Starting model-based feature extraction"
        );

        let classifier = self
            .backend(provider, config)
            .map_err(SuperclassError::classification_failed)?;
        analyze_features(classifier.as_ref(), text)
            .await
            .map_err(SuperclassError::classification_failed)
    }

    /// Extract text from `path`, classify it, then extract its features.
    ///
    /// Extraction or classification failures are returned as errors. A
    /// feature failure after a successful classification is reported in
    /// [`FeatureReport::features_error`].
    pub async fn extract_features_and_classify(
        &self,
        path: &Path,
        provider: Provider,
        config: &ModelConfig,
        options: &ClassificationOptions,
    ) -> SuperclassResult<FeatureReport> {
        let result = self
            .extract_and_classify_with_options(path, provider, config, options)
            .await?;

        match self.extract_features(&result.text, provider, config).await {
            Ok(features) => Ok(FeatureReport {
                result,
                features: Some(features),
                features_error: None,
            }),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Feature extraction failed after classification"
                );
                Ok(FeatureReport {
                    result,
                    features: None,
                    features_error: Some(e.to_string()),
                })
            }
        }
    }
}
