//! Static model catalog.
//!
//! Compiled-in reference data about the models each provider offers:
//! capabilities, token limits, pricing and typical latency. Used for cost
//! estimation, model comparison and recommendation; never consulted during
//! live classification and never mutated.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{SuperclassError, SuperclassResult};
use crate::types::{ModelConfig, ModelParameters, Provider};

/// What a model is good at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    GeneralPurpose,
    HighAccuracy,
    FastResponse,
    LongContext,
    CodeAnalysis,
    MultilingualSupport,
    StructuredOutput,
    SemanticAnalysis,
}

/// Kind of content a recommendation is made for.
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
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    GeneralText,
    TechnicalDoc,
    CreativeWriting,
    CodeSnippet,
    LegalDocument,
    AcademicPaper,
    BusinessReport,
    SocialMediaContent,
}

impl ContentType {
    /// Capabilities this content type requires of a model.
    pub fn required_capabilities(&self) -> &'static [ModelCapability] {
        use ModelCapability::*;
        match self {
            ContentType::GeneralText => &[],
            ContentType::TechnicalDoc => &[CodeAnalysis, StructuredOutput],
            ContentType::CreativeWriting => &[GeneralPurpose],
            ContentType::CodeSnippet => &[CodeAnalysis],
            ContentType::LegalDocument => &[HighAccuracy, SemanticAnalysis],
            ContentType::AcademicPaper => &[HighAccuracy, LongContext],
            ContentType::BusinessReport => &[StructuredOutput, SemanticAnalysis],
            ContentType::SocialMediaContent => &[FastResponse],
        }
    }

    /// All content types.
    pub fn all() -> Vec<ContentType> {
        Self::iter().collect()
    }
}

/// Pricing for a model, in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Cost per 1K input tokens.
    pub input_per_thousand_tokens: f64,
    /// Cost per 1K output tokens.
    pub output_per_thousand_tokens: f64,
    /// Whether the vendor offers batch processing.
    pub batch_processing_support: bool,
    /// Maximum concurrent requests allowed.
    pub concurrent_requests: u32,
}

/// Catalog entry for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    pub provider: Provider,
    pub capabilities: BTreeSet<ModelCapability>,
    /// Context window in tokens.
    pub max_tokens: u32,
    pub description: String,
    /// Recommended generation parameters.
    pub parameters: ModelParameters,
    pub cost: CostInfo,
    pub avg_latency_ms: u32,
}

impl ModelInfo {
    /// Whether the model has every capability in `required`.
    pub fn has_capabilities<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a ModelCapability>,
    {
        required.into_iter().all(|cap| self.capabilities.contains(cap))
    }
}

/// Difference between two catalog entries, first minus second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    /// Input cost per 1K tokens difference.
    pub cost_diff: f64,
    pub latency_diff: i64,
    pub token_limit_diff: i64,
    pub shared_capabilities: Vec<ModelCapability>,
    pub unique_to_first: Vec<ModelCapability>,
    pub unique_to_second: Vec<ModelCapability>,
}

/// Filters for [`recommend_models`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConstraints {
    /// Upper bound on input cost per 1K tokens.
    pub max_cost_per_thousand_tokens: f64,
    /// Upper bound on average latency.
    pub max_latency_ms: u32,
    #[serde(default)]
    pub required_capabilities: Vec<ModelCapability>,
    /// Lower bound on the context window.
    #[serde(default)]
    pub min_token_limit: u32,
}

impl ModelConstraints {
    /// Constraints admitting every model in the catalog.
    pub fn unconstrained() -> Self {
        Self {
            max_cost_per_thousand_tokens: f64::MAX,
            max_latency_ms: u32::MAX,
            required_capabilities: Vec::new(),
            min_token_limit: 0,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    provider: Provider,
    capabilities: &[ModelCapability],
    max_tokens: u32,
    description: &str,
    parameters: ModelParameters,
    cost: (f64, f64, u32),
    avg_latency_ms: u32,
) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        provider,
        capabilities: capabilities.iter().copied().collect(),
        max_tokens,
        description: description.to_string(),
        parameters,
        cost: CostInfo {
            input_per_thousand_tokens: cost.0,
            output_per_thousand_tokens: cost.1,
            batch_processing_support: true,
            concurrent_requests: cost.2,
        },
        avg_latency_ms,
    }
}

fn openai_params(max_tokens: u32) -> ModelParameters {
    ModelParameters {
        temperature: Some(0.7),
        max_tokens: Some(max_tokens),
        top_p: Some(1.0),
        frequency_penalty: Some(0.0),
        ..Default::default()
    }
}

fn anthropic_params(max_tokens: u32) -> ModelParameters {
    ModelParameters {
        temperature: Some(0.7),
        max_tokens: Some(max_tokens),
        top_k: Some(10),
        top_p: Some(0.8),
        ..Default::default()
    }
}

static CATALOG: Lazy<BTreeMap<String, ModelInfo>> = Lazy::new(|| {
    use ModelCapability::*;

    let models = vec![
        entry(
            "gpt-4",
            Provider::OpenAI,
            &[HighAccuracy, CodeAnalysis, LongContext, StructuredOutput, MultilingualSupport],
            8192,
            "Most capable GPT-4 model, best for complex tasks requiring deep understanding",
            openai_params(2000),
            (0.03, 0.06, 3500),
            2000,
        ),
        entry(
            "gpt-3.5-turbo",
            Provider::OpenAI,
            &[GeneralPurpose, FastResponse, MultilingualSupport],
            4096,
            "Fast and cost-effective model, good for most classification tasks",
            openai_params(1000),
            (0.001, 0.002, 5000),
            800,
        ),
        entry(
            "claude-3-opus-20240229",
            Provider::Anthropic,
            &[HighAccuracy, LongContext, CodeAnalysis, SemanticAnalysis, StructuredOutput],
            100_000,
            "Most capable Claude model, excellent for detailed analysis and classification",
            anthropic_params(3000),
            (0.015, 0.075, 4000),
            2500,
        ),
        entry(
            "claude-3-sonnet-20240229",
            Provider::Anthropic,
            &[GeneralPurpose, FastResponse, SemanticAnalysis],
            50_000,
            "Balanced Claude model, good performance and speed",
            anthropic_params(2000),
            (0.003, 0.015, 5000),
            1000,
        ),
    ];

    models.into_iter().map(|m| (m.id.clone(), m)).collect()
});

/// All catalog entries, ordered by model id.
pub fn models() -> Vec<&'static ModelInfo> {
    CATALOG.values().collect()
}

/// Look up a model.
pub fn model_info(model: &str) -> Option<&'static ModelInfo> {
    CATALOG.get(model)
}

/// Estimated USD cost of a call; `0.0` for models not in the catalog.
pub fn estimate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
    match model_info(model) {
        Some(info) => {
            input_tokens as f64 / 1000.0 * info.cost.input_per_thousand_tokens
                + output_tokens as f64 / 1000.0 * info.cost.output_per_thousand_tokens
        }
        None => 0.0,
    }
}

/// Compare two catalog models.
pub fn compare_models(first: &str, second: &str) -> SuperclassResult<ModelComparison> {
    let a = model_info(first).ok_or_else(|| SuperclassError::unknown_model(first))?;
    let b = model_info(second).ok_or_else(|| SuperclassError::unknown_model(second))?;

    Ok(ModelComparison {
        cost_diff: a.cost.input_per_thousand_tokens - b.cost.input_per_thousand_tokens,
        latency_diff: i64::from(a.avg_latency_ms) - i64::from(b.avg_latency_ms),
        token_limit_diff: i64::from(a.max_tokens) - i64::from(b.max_tokens),
        shared_capabilities: a.capabilities.intersection(&b.capabilities).copied().collect(),
        unique_to_first: a.capabilities.difference(&b.capabilities).copied().collect(),
        unique_to_second: b.capabilities.difference(&a.capabilities).copied().collect(),
    })
}

/// Models satisfying `constraints` plus the capabilities `content_type` needs.
///
/// Results come in catalog order (by id).
pub fn recommend_models(content_type: ContentType, constraints: &ModelConstraints) -> Vec<String> {
    let mut required: BTreeSet<ModelCapability> =
        constraints.required_capabilities.iter().copied().collect();
    required.extend(content_type.required_capabilities().iter().copied());

    CATALOG
        .values()
        .filter(|info| info.cost.input_per_thousand_tokens <= constraints.max_cost_per_thousand_tokens)
        .filter(|info| info.avg_latency_ms <= constraints.max_latency_ms)
        .filter(|info| info.max_tokens >= constraints.min_token_limit)
        .filter(|info| info.has_capabilities(&required))
        .map(|info| info.id.clone())
        .collect()
}

/// Models having `capability`.
pub fn models_by_capability(capability: ModelCapability) -> Vec<&'static ModelInfo> {
    CATALOG
        .values()
        .filter(|info| info.capabilities.contains(&capability))
        .collect()
}

/// Models offered by `provider`.
pub fn models_by_provider(provider: Provider) -> Vec<&'static ModelInfo> {
    CATALOG
        .values()
        .filter(|info| info.provider == provider)
        .collect()
}

/// Config for `model` carrying the catalog's recommended parameters.
///
/// Unknown models get a config with no parameters set.
pub fn default_model_config(model: &str, api_key: Option<String>) -> ModelConfig {
    let parameters = model_info(model)
        .map(|info| info.parameters.clone())
        .unwrap_or_default();

    ModelConfig {
        model: model.to_string(),
        api_key,
        parameters,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_estimate_cost() {
        assert!((estimate_cost("gpt-4", 1000, 1000) - 0.09).abs() < 1e-12);
        assert!((estimate_cost("gpt-3.5-turbo", 2000, 500) - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_cost_unknown_model() {
        assert_eq!(estimate_cost("unknown-model", 1000, 1000), 0.0);
    }

    #[test]
    fn test_compare_models() {
        let cmp = compare_models("gpt-4", "gpt-3.5-turbo").unwrap();
        assert!((cmp.cost_diff - 0.029).abs() < 1e-12);
        assert_eq!(cmp.latency_diff, 1200);
        assert_eq!(cmp.token_limit_diff, 4096);
        assert_eq!(cmp.shared_capabilities, vec![ModelCapability::MultilingualSupport]);
        assert!(cmp.unique_to_first.contains(&ModelCapability::HighAccuracy));
        assert!(cmp.unique_to_second.contains(&ModelCapability::FastResponse));
    }

    #[test]
    fn test_compare_models_is_anti_symmetric() {
        let ids: Vec<&str> = models().iter().map(|m| m.id.as_str()).collect();
        for a in &ids {
            for b in &ids {
                let ab = compare_models(a, b).unwrap();
                let ba = compare_models(b, a).unwrap();
                assert_eq!(ab.cost_diff, -ba.cost_diff);
                assert_eq!(ab.latency_diff, -ba.latency_diff);
                assert_eq!(ab.token_limit_diff, -ba.token_limit_diff);
                assert_eq!(ab.unique_to_first, ba.unique_to_second);
            }
        }
    }

    #[test]
    fn test_compare_unknown_model() {
        let err = compare_models("gpt-4", "nope").unwrap_err();
        assert!(matches!(err, SuperclassError::UnknownModel { model } if model == "nope"));
    }

    #[test]
    fn test_recommend_by_content_type() {
        let recommended = recommend_models(ContentType::LegalDocument, &ModelConstraints::unconstrained());
        assert_eq!(recommended, vec!["claude-3-opus-20240229"]);

        let recommended = recommend_models(ContentType::SocialMediaContent, &ModelConstraints::unconstrained());
        assert_eq!(recommended, vec!["claude-3-sonnet-20240229", "gpt-3.5-turbo"]);
    }

    #[test]
    fn test_recommend_respects_cost_and_latency() {
        let constraints = ModelConstraints {
            max_cost_per_thousand_tokens: 0.01,
            max_latency_ms: 900,
            required_capabilities: vec![],
            min_token_limit: 0,
        };
        assert_eq!(recommend_models(ContentType::GeneralText, &constraints), vec!["gpt-3.5-turbo"]);
    }

    #[test]
    fn test_recommend_unions_required_capabilities() {
        let constraints = ModelConstraints {
            required_capabilities: vec![ModelCapability::MultilingualSupport],
            ..ModelConstraints::unconstrained()
        };
        // CodeSnippet needs CodeAnalysis; only gpt-4 has both.
        assert_eq!(recommend_models(ContentType::CodeSnippet, &constraints), vec!["gpt-4"]);
    }

    #[test]
    fn test_models_by_provider_and_capability() {
        assert_eq!(models_by_provider(Provider::Anthropic).len(), 2);
        assert!(models_by_provider(Provider::Custom).is_empty());

        let long_context: Vec<&str> = models_by_capability(ModelCapability::LongContext)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(long_context, vec!["claude-3-opus-20240229", "gpt-4"]);
    }

    #[test]
    fn test_default_model_config() {
        let config = default_model_config("claude-3-opus-20240229", Some("key".into()));
        assert_eq!(config.parameters.max_tokens, Some(3000));
        assert_eq!(config.parameters.top_k, Some(10));
        assert!(config.has_api_key());

        let unknown = default_model_config("my-model", None);
        assert!(unknown.parameters.is_empty());
        assert_eq!(unknown.model, "my-model");
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(ContentType::TechnicalDoc.to_string(), "technical_doc");
        assert_eq!("code_snippet".parse::<ContentType>().unwrap(), ContentType::CodeSnippet);
        assert_eq!(ModelCapability::LongContext.to_string(), "long_context");
        assert_eq!(ContentType::all().len(), 8);
    }

    fn any_capabilities() -> impl Strategy<Value = Vec<ModelCapability>> {
        let all: Vec<ModelCapability> = ModelCapability::iter().collect();
        proptest::sample::subsequence(all, 0..=3)
    }

    fn any_content_type() -> impl Strategy<Value = ContentType> {
        proptest::sample::select(ContentType::all())
    }

    proptest! {
        #[test]
        fn prop_recommend_respects_all_bounds(
            max_cost in 0.0f64..0.1,
            max_latency in 0u32..5000,
            min_tokens in 0u32..200_000,
            required in any_capabilities(),
            content_type in any_content_type(),
        ) {
            let constraints = ModelConstraints {
                max_cost_per_thousand_tokens: max_cost,
                max_latency_ms: max_latency,
                required_capabilities: required.clone(),
                min_token_limit: min_tokens,
            };

            for id in recommend_models(content_type, &constraints) {
                let info = model_info(&id).unwrap();
                prop_assert!(info.max_tokens >= min_tokens);
                prop_assert!(info.cost.input_per_thousand_tokens <= max_cost);
                prop_assert!(info.avg_latency_ms <= max_latency);
                prop_assert!(info.has_capabilities(&required));
                prop_assert!(info.has_capabilities(content_type.required_capabilities()));
            }
        }
    }
}
