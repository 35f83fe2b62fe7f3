//! Health check and format listing endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize)]
pub struct FormatsResponse {
    pub formats: Vec<String>,
}

/// Extensions accepted by `/classify`.
/// GET /formats
pub async fn supported_formats(State(state): State<AppState>) -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: state.pipeline.supported_formats(),
    })
}
