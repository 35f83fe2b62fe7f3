//! superclass-core - Core library for superclass.
//!
//! This crate provides the classification types, the [`Classifier`] and
//! [`BackendFactory`] traits implemented by vendor backends, the
//! extract-then-classify [`ClassificationPipeline`], document feature
//! extraction, and the static model [`catalog`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use superclass_core::{ClassificationOptions, ClassificationPipeline, ModelConfig, Provider};
//! use superclass_extractors::ExtractorRegistry;
//!
//! let registry = Arc::new(ExtractorRegistry::with_defaults()?);
//! let pipeline = ClassificationPipeline::new(registry, factory);
//!
//! let options = ClassificationOptions::with_categories(["Tech", "Finance"]);
//! let result = pipeline
//!     .extract_and_classify_with_options(path, Provider::OpenAI, &ModelConfig::new("gpt-4"), &options)
//!     .await?;
//! println!("{} ({:.2})", result.classification.category, result.classification.confidence);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod prompts;
pub mod response;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use catalog::{
    ContentType, CostInfo, ModelCapability, ModelComparison, ModelConstraints, ModelInfo,
};
pub use config::Settings;
pub use error::{ErrorCode, SuperclassError, SuperclassResult};
pub use features::{DocumentFeatures, FeatureReport};
pub use pipeline::{ClassificationPipeline, ExtractResult};
pub use traits::{BackendFactory, Classifier, Prompt};
pub use types::{
    compare_classifications, Classification, ClassificationComparison, ClassificationOptions,
    ModelConfig, ModelParameters, Provider,
};
