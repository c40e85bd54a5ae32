use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported upload: {0}")]
    UnsupportedUpload(String),

    #[error("Upload too large")]
    PayloadTooLarge,

    #[error("Server missing API key")]
    MissingApiKey,

    #[error("LLM error: {0}")]
    Llm(LlmError),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey { .. } => AppError::MissingApiKey,
            other => AppError::Llm(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::UnsupportedUpload(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large (max 5MB)".to_string(),
                None,
            ),
            AppError::MissingApiKey => {
                tracing::error!("Generation requested but no API key is configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server missing API key.".to_string(),
                    None,
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate cover letter".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(message));
        if let Some(details) = details {
            body.insert("details".to_string(), Value::String(details));
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

/// Fallback for any route the router doesn't know.
pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}
