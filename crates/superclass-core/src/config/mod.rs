//! Configuration system for superclass.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SuperclassError, SuperclassResult};
use crate::types::{ModelConfig, Provider};

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Provider and model settings for a classification deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend vendor.
    pub provider: Provider,
    /// Backend configuration.
    pub model: ModelConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAI,
            model: ModelConfig::new(DEFAULT_MODEL),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> SuperclassResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SuperclassError::configuration(format!("Invalid {}: {}", key, e)))
}

impl Settings {
    /// Load settings from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> SuperclassResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| SuperclassError::configuration(e.to_string())),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SuperclassError::configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| SuperclassError::configuration(e.to_string())),
            _ => Err(SuperclassError::configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml",
            )),
        }
    }

    /// Load settings from environment variables.
    ///
    /// Reads `MODEL_PROVIDER`, `MODEL_TYPE`, `MODEL_ENDPOINT`,
    /// `MODEL_TEMPERATURE`, `MODEL_MAX_TOKENS`, `PREDEFINED_CATEGORIES`
    /// (comma separated), `STRICT_CATEGORIES` and the provider's API key
    /// variable (e.g. `OPENAI_API_KEY`).
    pub fn from_env() -> SuperclassResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> SuperclassResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(provider) = get("MODEL_PROVIDER") {
            settings.provider = provider.parse()?;
        }
        if let Some(model) = get("MODEL_TYPE") {
            settings.model.model = model.trim().to_string();
        }
        if let Some(endpoint) = get("MODEL_ENDPOINT") {
            settings.model.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(api_key) = get(settings.provider.api_key_env()) {
            settings.model.api_key = Some(api_key);
        }
        if let Some(value) = get("MODEL_TEMPERATURE") {
            settings.model.parameters.temperature = Some(parse_var("MODEL_TEMPERATURE", &value)?);
        }
        if let Some(value) = get("MODEL_MAX_TOKENS") {
            settings.model.parameters.max_tokens = Some(parse_var("MODEL_MAX_TOKENS", &value)?);
        }
        if let Some(value) = get("PREDEFINED_CATEGORIES") {
            settings.model.predefined_categories = value
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = get("STRICT_CATEGORIES") {
            settings.model.strict_categories = Some(parse_var("STRICT_CATEGORIES", &value)?);
        }

        Ok(settings)
    }
}
