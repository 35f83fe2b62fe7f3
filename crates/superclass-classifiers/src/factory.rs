//! Factory for creating classifier backends.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use superclass_core::error::SuperclassResult;
use superclass_core::traits::{BackendFactory, Classifier};
use superclass_core::types::{ModelConfig, Provider};

use crate::anthropic::AnthropicClassifier;
use crate::azure::AzureClassifier;
use crate::custom::CustomClassifier;
use crate::http::{build_client, DEFAULT_TIMEOUT};
use crate::openai::OpenAIClassifier;

/// Factory for creating classifier backends.
///
/// Holds one pooled HTTP client; every backend it builds shares it.
#[derive(Debug, Clone)]
pub struct ClassifierFactory {
    client: Client,
}

impl ClassifierFactory {
    /// Create a factory whose backends time out after `timeout`.
    pub fn new(timeout: Duration) -> SuperclassResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// Create a factory around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Create an OpenAI classifier with the given model.
    pub fn openai(&self, model: impl Into<String>) -> SuperclassResult<Box<dyn Classifier>> {
        self.create(Provider::OpenAI, &ModelConfig::new(model))
    }

    /// Create an Anthropic classifier with the given model.
    pub fn anthropic(&self, model: impl Into<String>) -> SuperclassResult<Box<dyn Classifier>> {
        self.create(Provider::Anthropic, &ModelConfig::new(model))
    }

    /// Create an Azure OpenAI classifier for a deployment URL.
    pub fn azure(
        &self,
        deployment: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> SuperclassResult<Box<dyn Classifier>> {
        self.create(
            Provider::Azure,
            &ModelConfig::new(deployment).with_endpoint(endpoint),
        )
    }

    /// Create a classifier for a custom endpoint.
    pub fn custom(
        &self,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> SuperclassResult<Box<dyn Classifier>> {
        self.create(
            Provider::Custom,
            &ModelConfig::new(model).with_endpoint(endpoint),
        )
    }
}

impl Default for ClassifierFactory {
    fn default() -> Self {
        // Client::new only panics when the TLS backend cannot initialise.
        build_client(DEFAULT_TIMEOUT)
            .map(Self::with_client)
            .unwrap_or_else(|_| Self::with_client(Client::new()))
    }
}

impl BackendFactory for ClassifierFactory {
    fn create(&self, provider: Provider, config: &ModelConfig) -> SuperclassResult<Box<dyn Classifier>> {
        debug!(
            provider = %provider,
            model = %config.model,
            has_api_key = config.has_api_key(),
            "Creating classifier backend"
        );

        let client = self.client.clone();
        let config = config.clone();
        match provider {
            Provider::OpenAI => Ok(Box::new(OpenAIClassifier::new(client, config)?)),
            Provider::Azure => Ok(Box::new(AzureClassifier::new(client, config)?)),
            Provider::Anthropic => Ok(Box::new(AnthropicClassifier::new(client, config)?)),
            Provider::Custom => Ok(Box::new(CustomClassifier::new(client, config)?)),
        }
    }
}
