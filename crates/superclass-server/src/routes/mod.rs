//! Route definitions for the REST API.

mod classify;
mod health;
mod models;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Documents
        .route("/classify", post(classify::classify))
        .route("/features", post(classify::features))
        .route("/formats", get(health::supported_formats))
        // Model catalog
        .route("/models", get(models::list_models))
        .route("/models/estimate", post(models::estimate_cost))
        .route("/models/compare", post(models::compare_models))
        .route("/models/recommend", post(models::recommend_models))
        .route("/models/:id", get(models::get_model))
        .layer(DefaultBodyLimit::max(body_limit))
        // Attach state
        .with_state(state)
}

pub use classify::*;
pub use health::*;
pub use models::*;
