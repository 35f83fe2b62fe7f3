//! Model catalog endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use superclass_core::catalog::{
    self, ContentType, ModelCapability, ModelComparison, ModelInfo,
};
use superclass_core::error::SuperclassError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Response listing catalog models.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// List every catalog model.
/// GET /models
pub async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: catalog::models().into_iter().cloned().collect(),
    })
}

/// Get one catalog model.
/// GET /models/:id
pub async fn get_model(Path(id): Path<String>) -> ApiResult<Json<ModelInfo>> {
    catalog::model_info(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| SuperclassError::unknown_model(id).into())
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: f64,
}

/// Estimate the cost of a request.
/// POST /models/estimate
pub async fn estimate_cost(Json(request): Json<EstimateRequest>) -> ApiResult<Json<EstimateResponse>> {
    if catalog::model_info(&request.model).is_none() {
        return Err(SuperclassError::unknown_model(request.model).into());
    }

    let estimated_cost =
        catalog::estimate_cost(&request.model, request.input_tokens, request.output_tokens);
    Ok(Json(EstimateResponse {
        model: request.model,
        input_tokens: request.input_tokens,
        output_tokens: request.output_tokens,
        estimated_cost,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub first: String,
    pub second: String,
}

/// Compare two catalog models.
/// POST /models/compare
pub async fn compare_models(Json(request): Json<CompareRequest>) -> ApiResult<Json<ModelComparison>> {
    Ok(Json(catalog::compare_models(&request.first, &request.second)?))
}

/// Request for model recommendations. Unset bounds fall back to the
/// server's `MAX_COST` and `MAX_LATENCY`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecommendRequest {
    pub content_type: ContentType,
    pub max_cost_per_thousand_tokens: Option<f64>,
    pub max_latency_ms: Option<u32>,
    pub required_capabilities: Vec<ModelCapability>,
    pub min_token_limit: u32,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub content_type: ContentType,
    pub models: Vec<String>,
}

/// Recommend models for a content type.
/// POST /models/recommend
pub async fn recommend_models(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Json<RecommendResponse> {
    let mut constraints = state.config.default_constraints();
    if let Some(cost) = request.max_cost_per_thousand_tokens {
        constraints.max_cost_per_thousand_tokens = cost;
    }
    if let Some(latency) = request.max_latency_ms {
        constraints.max_latency_ms = latency;
    }
    constraints.required_capabilities = request.required_capabilities;
    constraints.min_token_limit = request.min_token_limit;

    Json(RecommendResponse {
        content_type: request.content_type,
        models: catalog::recommend_models(request.content_type, &constraints),
    })
}
