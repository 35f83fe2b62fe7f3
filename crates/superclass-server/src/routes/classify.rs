//! Document classification endpoints.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use superclass_core::features::FeatureReport;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::upload::{StagedUpload, UploadForm};

/// Response for a classified upload.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: String,
    pub confidence: f64,
    pub summary: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

/// Classify an uploaded document.
/// POST /classify (multipart: `file`, optional `categories`, `include_text`)
pub async fn classify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ClassifyResponse>> {
    let form = UploadForm::read(multipart).await?;
    let staged = StagedUpload::write(&state.config.upload_dir, &form.file_name, &form.bytes).await?;

    info!(
        filename = %form.file_name,
        size = form.bytes.len(),
        has_categories = !form.categories.is_empty(),
        "Processing uploaded file"
    );

    let settings = &state.settings;
    let options = form.options(settings.model.strict_categories.unwrap_or(true));
    let result = state
        .pipeline
        .extract_and_classify_with_options(staged.path(), settings.provider, &settings.model, &options)
        .await;
    staged.remove();
    let result = result?;

    info!(
        category = %result.classification.category,
        confidence = result.classification.confidence,
        keywords = ?result.classification.keywords,
        "Classification completed successfully"
    );

    let classification = result.classification;
    Ok(Json(ClassifyResponse {
        category: classification.category,
        confidence: classification.confidence,
        summary: classification.summary,
        keywords: classification.keywords,
        raw_text: form.include_text.then_some(result.text),
    }))
}

/// Classify an uploaded document and extract its features.
/// POST /features (same form as /classify)
pub async fn features(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<FeatureReport>> {
    let form = UploadForm::read(multipart).await?;
    let staged = StagedUpload::write(&state.config.upload_dir, &form.file_name, &form.bytes).await?;

    info!(
        filename = %form.file_name,
        size = form.bytes.len(),
        "Extracting document features"
    );

    let settings = &state.settings;
    let options = form.options(settings.model.strict_categories.unwrap_or(true));
    let report = state
        .pipeline
        .extract_features_and_classify(staged.path(), settings.provider, &settings.model, &options)
        .await;
    staged.remove();
    let mut report = report?;

    if !form.include_text {
        report.result.text.clear();
    }
    Ok(Json(report))
}
