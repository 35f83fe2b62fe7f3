//! Backend configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ClassificationOptions;
use crate::error::{SuperclassError, SuperclassResult};

/// Generation parameters recognized by the backends.
///
/// Unset fields fall back to the backend's own defaults. Unknown keys are
/// rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling (Anthropic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Frequency penalty (OpenAI family).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

impl ModelParameters {
    /// Build parameters from a loosely typed map, rejecting unknown keys.
    pub fn from_map(map: HashMap<String, serde_json::Value>) -> SuperclassResult<Self> {
        let object: serde_json::Map<String, serde_json::Value> = map.into_iter().collect();
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| SuperclassError::configuration(format!("Invalid model parameters: {}", e)))
    }

    /// Overlay every field set in `update`.
    pub fn merge(&mut self, update: &ModelParameters) {
        if update.temperature.is_some() {
            self.temperature = update.temperature;
        }
        if update.max_tokens.is_some() {
            self.max_tokens = update.max_tokens;
        }
        if update.top_p.is_some() {
            self.top_p = update.top_p;
        }
        if update.top_k.is_some() {
            self.top_k = update.top_k;
        }
        if update.frequency_penalty.is_some() {
            self.frequency_penalty = update.frequency_penalty;
        }
    }

    /// Whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Configuration a backend is constructed from.
///
/// Empty strings and empty lists mean "not set": backends apply their
/// provider defaults at construction, and [`ModelConfig::merge`] leaves the
/// current value untouched.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Endpoint URL; required for Azure and Custom backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model identifier (or Azure deployment name).
    #[serde(default)]
    pub model: String,
    /// API key. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Generation parameters.
    #[serde(default, skip_serializing_if = "ModelParameters::is_empty")]
    pub parameters: ModelParameters,
    /// Default allow-list, used when a call supplies no categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predefined_categories: Vec<String>,
    /// Default strict-enforcement flag for the predefined categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_categories: Option<bool>,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.has_api_key())
            .field("parameters", &self.parameters)
            .field("predefined_categories", &self.predefined_categories)
            .field("strict_categories", &self.strict_categories)
            .finish()
    }
}

impl ModelConfig {
    /// Config for a model, everything else unset.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set generation parameters.
    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the predefined category allow-list.
    pub fn with_predefined_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predefined_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default strict-enforcement flag.
    pub fn with_strict_categories(mut self, strict: bool) -> Self {
        self.strict_categories = Some(strict);
        self
    }

    /// Endpoint, if set and non-blank.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// API key, if set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Merge an update into this config.
    ///
    /// Only set fields are applied: `None`, empty strings, empty category
    /// lists and unset parameters leave the current value unchanged.
    pub fn merge(&mut self, update: ModelConfig) {
        if let Some(endpoint) = update.endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        if !update.model.trim().is_empty() {
            self.model = update.model;
        }
        if let Some(api_key) = update.api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(api_key);
        }
        self.parameters.merge(&update.parameters);
        if !update.predefined_categories.is_empty() {
            self.predefined_categories = update.predefined_categories;
        }
        if update.strict_categories.is_some() {
            self.strict_categories = update.strict_categories;
        }
    }

    /// Options derived from the predefined categories.
    pub fn default_options(&self) -> ClassificationOptions {
        ClassificationOptions::with_categories(self.predefined_categories.iter().cloned())
            .with_strict(self.strict_categories.unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameters_from_map() {
        let mut map = HashMap::new();
        map.insert("temperature".to_string(), json!(0.2));
        map.insert("max_tokens".to_string(), json!(512));

        let params = ModelParameters::from_map(map).unwrap();
        assert_eq!(params.temperature, Some(0.2));
        assert_eq!(params.max_tokens, Some(512));
        assert_eq!(params.top_p, None);
    }

    #[test]
    fn test_parameters_reject_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("temprature".to_string(), json!(0.2));

        let err = ModelParameters::from_map(map).unwrap_err();
        assert!(err.to_string().contains("temprature"));
    }

    #[test]
    fn test_parameters_reject_wrong_type() {
        let mut map = HashMap::new();
        map.insert("max_tokens".to_string(), json!("lots"));
        assert!(ModelParameters::from_map(map).is_err());
    }

    #[test]
    fn test_merge_ignores_empty_fields() {
        let mut config = ModelConfig::new("gpt-4")
            .with_endpoint("https://example.com/v1")
            .with_api_key("sk-original")
            .with_predefined_categories(["Tech"])
            .with_parameters(ModelParameters {
                temperature: Some(0.3),
                max_tokens: Some(2000),
                ..Default::default()
            });

        config.merge(ModelConfig {
            endpoint: Some(String::new()),
            model: String::new(),
            api_key: Some("  ".to_string()),
            ..Default::default()
        });

        assert_eq!(config.endpoint(), Some("https://example.com/v1"));
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.api_key(), Some("sk-original"));
        assert_eq!(config.predefined_categories, vec!["Tech"]);
        assert_eq!(config.parameters.temperature, Some(0.3));
    }

    #[test]
    fn test_merge_applies_set_fields() {
        let mut config = ModelConfig::new("gpt-4").with_parameters(ModelParameters {
            temperature: Some(0.3),
            max_tokens: Some(2000),
            ..Default::default()
        });

        config.merge(
            ModelConfig::new("gpt-3.5-turbo")
                .with_api_key("sk-new")
                .with_strict_categories(false)
                .with_parameters(ModelParameters {
                    max_tokens: Some(500),
                    ..Default::default()
                }),
        );

        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.api_key(), Some("sk-new"));
        assert_eq!(config.parameters.temperature, Some(0.3));
        assert_eq!(config.parameters.max_tokens, Some(500));
        assert_eq!(config.strict_categories, Some(false));
    }

    #[test]
    fn test_api_key_never_serialized_or_printed() {
        let config = ModelConfig::new("gpt-4").with_api_key("sk-secret");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("has_api_key: true"));
    }

    #[test]
    fn test_default_options() {
        let config = ModelConfig::new("gpt-4")
            .with_predefined_categories(["Tech", "Finance"])
            .with_strict_categories(false);
        let options = config.default_options();

        assert_eq!(options.categories(), &["Tech", "Finance"]);
        assert!(!options.strict);
        assert!(ModelConfig::new("gpt-4").default_options().is_free_form());
    }
}
