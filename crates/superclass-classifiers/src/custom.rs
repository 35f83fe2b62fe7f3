//! Generic classifier for self-hosted or third-party endpoints.
//!
//! Request: `{"model", "messages": [{"role", "content"}], "parameters"}`.
//! Response: `{"content": "<classification JSON>"}`. Authentication is an
//! optional bearer token.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use superclass_core::error::{SuperclassError, SuperclassResult};
use superclass_core::traits::{Classifier, Prompt};
use superclass_core::types::{ModelConfig, ModelParameters, Provider};

use crate::http::{
    bearer_headers, chat_messages, empty_reply, parse_endpoint, parse_envelope, post_json,
    resolve_api_key, ChatMessage,
};

#[derive(Debug, Serialize)]
struct CustomRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "ModelParameters::is_empty")]
    parameters: ModelParameters,
}

#[derive(Debug, Deserialize)]
struct CustomResponse {
    #[serde(default)]
    content: String,
}

/// Custom endpoint classifier.
pub struct CustomClassifier {
    client: Client,
    config: ModelConfig,
    endpoint: Url,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for CustomClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomClassifier")
            .field("model", &self.config.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl CustomClassifier {
    /// Create a new custom classifier. An endpoint is required; the API key
    /// (config or `CUSTOM_API_KEY`) is optional.
    pub fn new(client: Client, config: ModelConfig) -> SuperclassResult<Self> {
        let endpoint = config
            .endpoint()
            .ok_or_else(|| SuperclassError::missing_endpoint(Provider::Custom))
            .and_then(parse_endpoint)?;
        let api_key = resolve_api_key(&config, Provider::Custom);

        debug!(
            model = %config.model,
            endpoint = %endpoint,
            has_api_key = api_key.is_some(),
            "Created custom classifier"
        );

        Ok(Self {
            client,
            config,
            endpoint,
            api_key,
        })
    }

    fn request<'a>(&'a self, prompt: &Prompt) -> CustomRequest<'a> {
        CustomRequest {
            model: &self.config.model,
            messages: chat_messages(prompt),
            parameters: self.config.parameters.clone(),
        }
    }
}

#[async_trait]
impl Classifier for CustomClassifier {
    async fn complete(&self, prompt: &Prompt) -> SuperclassResult<String> {
        let headers = bearer_headers(self.api_key.as_ref())?;
        let body = post_json(
            &self.client,
            Provider::Custom,
            &self.endpoint,
            headers,
            &self.request(prompt),
        )
        .await?;

        let response: CustomResponse = parse_envelope(Provider::Custom, &body)?;
        if response.content.trim().is_empty() {
            return Err(empty_reply(Provider::Custom, &body));
        }
        Ok(response.content)
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
        if api_key.is_some() {
            self.api_key = api_key;
        }
        Ok(())
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn provider(&self) -> Provider {
        Provider::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::serve;
    use crate::http::{build_client, DEFAULT_TIMEOUT};
    use axum::http::StatusCode;
    use serde_json::json;
    use superclass_core::error::ErrorCode;

    fn client() -> Client {
        build_client(DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_endpoint_required() {
        let err = CustomClassifier::new(client(), ModelConfig::new("local")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CfgMissingEndpoint);
    }

    #[test]
    fn test_request_envelope() {
        let config = ModelConfig::new("local-llm")
            .with_endpoint("http://localhost:8000/classify")
            .with_parameters(ModelParameters {
                temperature: Some(0.5),
                ..Default::default()
            });
        let c = CustomClassifier::new(client(), config).unwrap();

        let body = serde_json::to_value(c.request(&Prompt::new("sys", "usr"))).unwrap();
        assert_eq!(body["model"], "local-llm");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!((body["parameters"]["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);

        let c = CustomClassifier::new(client(), ModelConfig::new("m").with_endpoint("http://localhost:8000")).unwrap();
        let body = serde_json::to_value(c.request(&Prompt::user("usr"))).unwrap();
        assert!(body.get("parameters").is_none());
    }

    #[tokio::test]
    async fn test_round_trip_with_bearer() {
        let (base, captured) = serve(StatusCode::OK, json!({"content": "{\"category\": \"Notes\"}"})).await;
        let config = ModelConfig::new("local")
            .with_endpoint(format!("{}/classify", base))
            .with_api_key("token-1");
        let c = CustomClassifier::new(client(), config).unwrap();

        let result = c.classify("meeting notes").await.unwrap();
        assert_eq!(result.category, "Notes");
        assert_eq!(captured.lock().unwrap()[0].headers["authorization"], "Bearer token-1");
    }

    #[tokio::test]
    async fn test_empty_content() {
        let (base, _) = serve(StatusCode::OK, json!({"result": "ok"})).await;
        let c = CustomClassifier::new(client(), ModelConfig::new("local").with_endpoint(format!("{}/classify", base)))
            .unwrap();

        let err = c.complete(&Prompt::user("x")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DecEmptyResponse);
    }
}
