//! Anthropic (Claude) classifier.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use superclass_core::error::{SuperclassError, SuperclassResult};
use superclass_core::traits::{Classifier, Prompt};
use superclass_core::types::{ModelConfig, Provider};

use crate::http::{empty_reply, key_header, parse_endpoint, parse_envelope, post_json, resolve_api_key};

/// Default messages endpoint.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
/// Model used when the config names none.
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-opus-20240229";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic classifier.
pub struct AnthropicClassifier {
    client: Client,
    config: ModelConfig,
    endpoint: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for AnthropicClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClassifier")
            .field("model", &self.config.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl AnthropicClassifier {
    /// Create a new Anthropic classifier.
    ///
    /// Defaults the endpoint and model, and falls back to
    /// `ANTHROPIC_API_KEY` when the config carries no key.
    pub fn new(client: Client, config: ModelConfig) -> SuperclassResult<Self> {
        let api_key = resolve_api_key(&config, Provider::Anthropic).ok_or_else(|| {
            SuperclassError::missing_credential(Provider::Anthropic, "ANTHROPIC_API_KEY")
        })?;
        Self::with_api_key(client, config, api_key)
    }

    pub(crate) fn with_api_key(
        client: Client,
        mut config: ModelConfig,
        api_key: SecretString,
    ) -> SuperclassResult<Self> {
        let endpoint = parse_endpoint(config.endpoint().unwrap_or(ANTHROPIC_API_URL))?;
        if config.model.trim().is_empty() {
            config.model = ANTHROPIC_DEFAULT_MODEL.to_string();
        }

        debug!(
            model = %config.model,
            endpoint = %endpoint,
            has_api_key = true,
            "Created Anthropic classifier"
        );

        Ok(Self {
            client,
            config,
            endpoint,
            api_key,
        })
    }

    /// The system prompt travels in the top-level `system` field, not as a message.
    fn request(&self, prompt: &Prompt) -> AnthropicRequest {
        let params = &self.config.parameters;
        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: prompt.system.clone(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt.user.clone(),
            }],
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
        }
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    async fn complete(&self, prompt: &Prompt) -> SuperclassResult<String> {
        let mut headers = key_header("x-api-key", &self.api_key)?;
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));

        let body = post_json(
            &self.client,
            Provider::Anthropic,
            &self.endpoint,
            headers,
            &self.request(prompt),
        )
        .await?;

        let response: AnthropicResponse = parse_envelope(Provider::Anthropic, &body)?;
        response
            .content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| empty_reply(Provider::Anthropic, &body))
    }

    fn configure(&mut self, update: ModelConfig) -> SuperclassResult<()> {
        let endpoint = match update.endpoint() {
            Some(endpoint) => Some(parse_endpoint(endpoint)?),
            None => None,
        };
        let api_key = update.api_key().map(|k| SecretString::new(k.to_string()));

        self.config.merge(update);
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = api_key {
            self.api_key = api_key;
        }
        Ok(())
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::serve;
    use crate::http::{build_client, DEFAULT_TIMEOUT};
    use axum::http::StatusCode;
    use serde_json::json;
    use superclass_core::types::{ClassificationOptions, ModelParameters};

    fn classifier(config: ModelConfig) -> AnthropicClassifier {
        AnthropicClassifier::with_api_key(
            build_client(DEFAULT_TIMEOUT).unwrap(),
            config,
            SecretString::new("sk-ant-test".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let c = classifier(ModelConfig::default());
        assert_eq!(c.model_name(), ANTHROPIC_DEFAULT_MODEL);
        assert_eq!(c.endpoint.as_str(), ANTHROPIC_API_URL);
    }

    #[test]
    fn test_request_body() {
        let c = classifier(ModelConfig::new("claude-3-sonnet-20240229").with_parameters(ModelParameters {
            temperature: Some(0.7),
            top_k: Some(10),
            ..Default::default()
        }));
        let body = serde_json::to_value(c.request(&Prompt::new("be terse", "classify me"))).unwrap();

        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["top_k"], 10);
        assert!(body.get("top_p").is_none());
    }

    #[tokio::test]
    async fn test_classify_round_trip() {
        let (base, captured) = serve(
            StatusCode::OK,
            json!({
                "type": "message",
                "content": [{"type": "text", "text": "```json\n{\"category\": \"legal\", \"confidence\": 0.9}\n```"}]
            }),
        )
        .await;
        let c = classifier(ModelConfig::new("claude-3-opus-20240229").with_endpoint(format!("{}/v1/messages", base)));

        let result = c
            .classify_with_options("NDA terms", &ClassificationOptions::with_categories(["Legal", "HR"]))
            .await
            .unwrap();
        assert_eq!(result.category, "Legal");

        let requests = captured.lock().unwrap();
        assert_eq!(requests[0].headers["x-api-key"], "sk-ant-test");
        assert_eq!(requests[0].headers["anthropic-version"], ANTHROPIC_VERSION);
        assert!(requests[0].body["system"].as_str().unwrap().contains("classification expert"));
    }

    #[tokio::test]
    async fn test_empty_content_is_decode_failure() {
        let (base, _) = serve(StatusCode::OK, json!({"type": "message", "content": []})).await;
        let c = classifier(ModelConfig::default().with_endpoint(format!("{}/v1/messages", base)));

        let err = c.complete(&Prompt::user("x")).await.unwrap_err();
        assert_eq!(err.code(), superclass_core::ErrorCode::DecEmptyResponse);
    }
}
