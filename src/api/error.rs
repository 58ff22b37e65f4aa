//! API error types with structured JSON responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::assembly::ValidationError;
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::structuring::StructuringError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upload too large")]
    PayloadTooLarge,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload exceeds the size limit".to_string(),
            ),
            ApiError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::Extraction(err) => extraction_status(err),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

/// OCR provider failures are logged in full and reported generically.
fn extraction_status(err: &ExtractionError) -> (StatusCode, &'static str, String) {
    match err {
        ExtractionError::EmptyUpload => {
            (StatusCode::BAD_REQUEST, "EMPTY_UPLOAD", err.to_string())
        }
        ExtractionError::Oversize { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", err.to_string())
        }
        ExtractionError::UnsupportedFormat => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
            err.to_string(),
        ),
        ExtractionError::UndecodableImage(_) => (
            StatusCode::BAD_REQUEST,
            "UNDECODABLE_IMAGE",
            "Image could not be decoded".to_string(),
        ),
        ExtractionError::OcrService(StructuringError::MissingApiKey) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "OCR_NOT_CONFIGURED",
            "OCR service is not configured".to_string(),
        ),
        ExtractionError::OcrService(inner) => {
            tracing::warn!(error = %inner, "OCR provider failure");
            let status = match inner {
                StructuringError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, "OCR_FAILED", "OCR service failed".to_string())
        }
        ExtractionError::MalformedReply(detail) => {
            tracing::warn!(detail, "OCR reply unusable");
            (
                StatusCode::BAD_GATEWAY,
                "OCR_UNREADABLE",
                "OCR service returned an unreadable reply".to_string(),
            )
        }
        ExtractionError::NothingRecognized => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NOTHING_RECOGNIZED",
            err.to_string(),
        ),
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Task join error: {err}"))
    }
}
