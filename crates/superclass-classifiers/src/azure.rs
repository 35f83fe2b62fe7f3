//! Azure OpenAI classifier.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use superclass_core::error::{SuperclassError, SuperclassResult};
use superclass_core::traits::{Classifier, Prompt};
use superclass_core::types::{ModelConfig, Provider};

use crate::http::{key_header, parse_endpoint, post_json, resolve_api_key};
use crate::openai::{first_choice, ChatCompletionRequest};

/// Azure OpenAI classifier.
///
/// The endpoint is the full deployment URL, e.g.
/// `https://{resource}.openai.azure.com/openai/deployments/{deployment}/chat/completions?api-version=2024-02-01`.
/// Azure has no default endpoint or model.
pub struct AzureClassifier {
    client: Client,
    config: ModelConfig,
    endpoint: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for AzureClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureClassifier")
            .field("model", &self.config.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl AzureClassifier {
    /// Create a new Azure OpenAI classifier.
    pub fn new(client: Client, config: ModelConfig) -> SuperclassResult<Self> {
        let endpoint = config
            .endpoint()
            .ok_or_else(|| SuperclassError::missing_endpoint(Provider::Azure))
            .and_then(parse_endpoint)?;
        let api_key = resolve_api_key(&config, Provider::Azure).ok_or_else(|| {
            SuperclassError::missing_credential(Provider::Azure, "AZURE_OPENAI_API_KEY")
        })?;

        debug!(
            deployment = %config.model,
            host = endpoint.host_str().unwrap_or(""),
            has_api_key = true,
            "Created Azure OpenAI classifier"
        );

        Ok(Self {
            client,
            config,
            endpoint,
            api_key,
        })
    }

    fn request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        let model = Some(self.config.model.clone()).filter(|m| !m.trim().is_empty());
        ChatCompletionRequest::new(model, prompt, &self.config.parameters)
    }
}

#[async_trait]
impl Classifier for AzureClassifier {
    async fn complete(&self, prompt: &Prompt) -> SuperclassResult<String> {
        let headers = key_header("api-key", &self.api_key)?;
        let body = post_json(
            &self.client,
            Provider::Azure,
            &self.endpoint,
            headers,
            &self.request(prompt),
        )
        .await?;
        first_choice(Provider::Azure, &body)
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
        Provider::Azure
    }
}
