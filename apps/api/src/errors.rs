use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assistant::AssistantError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// No configured renderer can run in this environment.
    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// Every configured renderer ran and failed.
    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("PDF extraction failed: {0}")]
    PdfExtraction(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Assistant(e) => {
                tracing::error!("Assistant error: {e}");
                match e {
                    AssistantError::Unavailable(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "ASSISTANT_UNAVAILABLE",
                        e.to_string(),
                    ),
                    AssistantError::Timeout { .. } => {
                        (StatusCode::GATEWAY_TIMEOUT, "ASSISTANT_TIMEOUT", e.to_string())
                    }
                    _ => (StatusCode::BAD_GATEWAY, "ASSISTANT_ERROR", e.to_string()),
                }
            }
            AppError::RendererUnavailable(msg) => {
                tracing::warn!("Renderer unavailable: {msg}");
                (
                    StatusCode::NOT_IMPLEMENTED,
                    "RENDERER_UNAVAILABLE",
                    msg.clone(),
                )
            }
            AppError::RenderFailed(msg) => {
                tracing::error!("Render failed: {msg}");
                (StatusCode::BAD_GATEWAY, "RENDER_FAILED", msg.clone())
            }
            AppError::PdfExtraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PDF_EXTRACTION_FAILED",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// JSON body extractor whose rejections use the `AppError` envelope
/// instead of Axum's plain-text body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Router fallback: unknown paths get the same error envelope as everything else.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
