//! superclass-classifiers - classifier backends for superclass.
//!
//! Each backend turns a [`Prompt`] into a vendor HTTP request and returns the
//! reply text; prompt building, response decoding and category enforcement
//! live in `superclass-core`.
//!
//! # Supported Providers
//!
//! - **OpenAI** - chat completions, bearer auth
//! - **Azure** - Azure OpenAI deployments, `api-key` header
//! - **Anthropic** - messages API, `x-api-key` header
//! - **Custom** - any endpoint accepting `{model, messages, parameters}`
//!
//! # Example
//!
//! ```ignore
//! use superclass_classifiers::ClassifierFactory;
//! use superclass_core::traits::BackendFactory;
//!
//! let factory = ClassifierFactory::default();
//! let classifier = factory.openai("gpt-4")?;
//! let result = classifier.classify("Quarterly revenue grew 12%").await?;
//! ```

mod anthropic;
mod azure;
mod custom;
mod factory;
mod http;
mod openai;

pub use anthropic::{AnthropicClassifier, ANTHROPIC_API_URL, ANTHROPIC_DEFAULT_MODEL};
pub use azure::AzureClassifier;
pub use custom::CustomClassifier;
pub use factory::ClassifierFactory;
pub use http::{build_client, DEFAULT_TIMEOUT};
pub use openai::{OpenAIClassifier, OPENAI_API_URL, OPENAI_DEFAULT_MODEL};

// Re-export core types for convenience
pub use superclass_core::traits::{BackendFactory, Classifier, Prompt};
pub use superclass_core::types::{ModelConfig, Provider};
