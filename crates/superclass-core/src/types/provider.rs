//! Classification provider selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::SuperclassError;

/// AI vendor backing a classifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions.
    #[default]
    OpenAI,
    /// Azure OpenAI deployment.
    Azure,
    /// Anthropic messages API.
    Anthropic,
    /// Any endpoint speaking the generic `{model, messages, parameters}` envelope.
    Custom,
}

impl Provider {
    /// All providers, in declaration order.
    pub fn all() -> Vec<Provider> {
        Self::iter().collect()
    }

    /// Environment variable holding the process-wide API key fallback.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Azure => "AZURE_OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Custom => "CUSTOM_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = SuperclassError;

    /// Case-insensitive; unknown names are rejected rather than defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::iter()
            .find(|provider| provider.to_string() == wanted)
            .ok_or_else(|| SuperclassError::unsupported_provider(s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Provider::OpenAI.to_string(), "openai");
        assert_eq!(Provider::Azure.to_string(), "azure");
        let name: &'static str = Provider::Anthropic.into();
        assert_eq!(name, "anthropic");
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!(" ANTHROPIC ".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("custom".parse::<Provider>().unwrap(), Provider::Custom);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = "gemini".parse::<Provider>().unwrap_err();
        assert!(matches!(err, SuperclassError::UnsupportedProvider { provider } if provider == "gemini"));
    }

    #[test]
    fn test_serde_roundtrip_names() {
        let json = serde_json::to_string(&Provider::OpenAI).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: Provider = serde_json::from_str("\"azure\"").unwrap();
        assert_eq!(parsed, Provider::Azure);
    }

    #[test]
    fn test_all_providers() {
        assert_eq!(Provider::all().len(), 4);
    }
}
