//! Classifier trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SuperclassResult;
use crate::prompts::build_classification_prompt;
use crate::response::{decode_classification, enforce_category};
use crate::types::{Classification, ClassificationOptions, ModelConfig, Provider};

/// Instruction pair sent to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// System instruction, if the request carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// User message.
    pub user: String,
}

impl Prompt {
    /// Prompt with a system instruction.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }

    /// Prompt with only a user message.
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }
}

/// Core classifier trait - every vendor backend implements this.
///
/// Backends only implement the wire call ([`Classifier::complete`]); prompt
/// construction, response decoding and category enforcement are shared.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Send the prompt to the backend once and return the raw text reply.
    ///
    /// Transport, authentication and HTTP status failures are returned as
    /// errors; nothing is retried.
    async fn complete(&self, prompt: &Prompt) -> SuperclassResult<String>;

    /// Classify with free-form category selection.
    async fn classify(&self, text: &str) -> SuperclassResult<Classification> {
        self.classify_with_options(text, &ClassificationOptions::default())
            .await
    }

    /// Classify, constraining the category when `options` lists any.
    async fn classify_with_options(
        &self,
        text: &str,
        options: &ClassificationOptions,
    ) -> SuperclassResult<Classification> {
        debug!(
            provider = %self.provider(),
            model = self.model_name(),
            content_length = text.len(),
            has_categories = !options.is_free_form(),
            "Starting content classification"
        );

        let prompt = build_classification_prompt(text, options);
        let raw = self.complete(&prompt).await?;
        let mut classification = decode_classification(&raw)?;
        enforce_category(&mut classification, options)?;

        debug!(
            category = %classification.category,
            confidence = classification.confidence,
            "Classification complete"
        );
        Ok(classification)
    }

    /// Merge `update` into the working config; unset fields are left as is.
    fn configure(&mut self, update: ModelConfig) -> SuperclassResult<()>;

    /// Current working config.
    fn config(&self) -> &ModelConfig;

    /// Get the model name.
    fn model_name(&self) -> &str {
        &self.config().model
    }

    /// Vendor this backend talks to.
    fn provider(&self) -> Provider;
}

/// Constructs classifier backends for a provider.
///
/// Construction is where provider defaults apply: default endpoint, default
/// model and the process-wide API key fallback.
#[cfg_attr(test, mockall::automock)]
pub trait BackendFactory: Send + Sync {
    /// Build a backend for `provider` from `config`.
    fn create(
        &self,
        provider: Provider,
        config: &ModelConfig,
    ) -> SuperclassResult<Box<dyn Classifier>>;
}
