//! Error handling for the REST API server.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use superclass_core::error::{ErrorCode, SuperclassError};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

/// HTTP status for a core error code.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ExtUnsupportedExtension => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorCode::ExtReadFailed | ErrorCode::ExtMalformed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::CatInvalidCategory => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::CfgUnsupportedProvider => StatusCode::BAD_REQUEST,
        ErrorCode::NetTimeout
        | ErrorCode::NetConnectionFailed
        | ErrorCode::NetHttpStatus
        | ErrorCode::DecInvalidJson
        | ErrorCode::DecEmptyResponse => StatusCode::BAD_GATEWAY,
        ErrorCode::ModUnknownModel => StatusCode::NOT_FOUND,
        ErrorCode::ExtRegistration
        | ErrorCode::CfgMissingCredential
        | ErrorCode::CfgMissingEndpoint
        | ErrorCode::CfgInvalidValue
        | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Convert from superclass-core errors
impl From<SuperclassError> for ApiError {
    fn from(err: SuperclassError) -> Self {
        let code = err.code();
        let status = status_for(code);
        if status.is_server_error() {
            error!(code = %code, error = %err, "Request failed");
        }

        let mut api_error = ApiError::new(status, code.as_str(), err.to_string());
        if let SuperclassError::Transport {
            status: Some(upstream),
            vendor_code,
            ..
        } = err.root()
        {
            api_error = api_error.with_details(serde_json::json!({
                "upstream_status": upstream,
                "vendor_code": vendor_code,
            }));
        } else if let Some(suggestion) = err.root().suggestion() {
            api_error = api_error.with_details(serde_json::json!({ "suggestion": suggestion }));
        }
        api_error
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), "BAD_MULTIPART", err.body_text())
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
