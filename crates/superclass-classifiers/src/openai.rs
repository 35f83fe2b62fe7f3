//! OpenAI chat-completions classifier.

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

/// Default chat-completions endpoint.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Model used when the config names none.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Chat-completions request body, shared with Azure OpenAI.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

impl ChatCompletionRequest {
    pub(crate) fn new(model: Option<String>, prompt: &Prompt, parameters: &ModelParameters) -> Self {
        Self {
            model,
            messages: chat_messages(prompt),
            temperature: parameters.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: parameters.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            top_p: parameters.top_p,
            frequency_penalty: parameters.frequency_penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text of the first choice of a chat-completions reply.
pub(crate) fn first_choice(provider: Provider, body: &str) -> SuperclassResult<String> {
    let response: ChatCompletionResponse = parse_envelope(provider, body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| empty_reply(provider, body))
}

/// OpenAI classifier.
pub struct OpenAIClassifier {
    client: Client,
    config: ModelConfig,
    endpoint: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for OpenAIClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClassifier")
            .field("model", &self.config.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenAIClassifier {
    /// Create a new OpenAI classifier.
    ///
    /// Defaults the endpoint and model, and falls back to `OPENAI_API_KEY`
    /// when the config carries no key.
    pub fn new(client: Client, config: ModelConfig) -> SuperclassResult<Self> {
        let api_key = resolve_api_key(&config, Provider::OpenAI)
            .ok_or_else(|| SuperclassError::missing_credential(Provider::OpenAI, "OPENAI_API_KEY"))?;
        Self::with_api_key(client, config, api_key)
    }

    pub(crate) fn with_api_key(
        client: Client,
        mut config: ModelConfig,
        api_key: SecretString,
    ) -> SuperclassResult<Self> {
        let endpoint = parse_endpoint(config.endpoint().unwrap_or(OPENAI_API_URL))?;
        if config.model.trim().is_empty() {
            config.model = OPENAI_DEFAULT_MODEL.to_string();
        }

        debug!(
            model = %config.model,
            endpoint = %endpoint,
            has_api_key = true,
            "Created OpenAI classifier"
        );

        Ok(Self {
            client,
            config,
            endpoint,
            api_key,
        })
    }

    pub(crate) fn request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest::new(Some(self.config.model.clone()), prompt, &self.config.parameters)
    }
}

#[async_trait]
impl Classifier for OpenAIClassifier {
    async fn complete(&self, prompt: &Prompt) -> SuperclassResult<String> {
        let headers = bearer_headers(Some(&self.api_key))?;
        let body = post_json(
            &self.client,
            Provider::OpenAI,
            &self.endpoint,
            headers,
            &self.request(prompt),
        )
        .await?;
        first_choice(Provider::OpenAI, &body)
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
        debug!(model = %self.config.model, endpoint = %self.endpoint, "Reconfigured OpenAI classifier");
        Ok(())
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}
