//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub has_provider_key: bool,
}

/// `GET /api/v1/health`: liveness plus whether the model provider is configured.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: crate::config::SERVICE_ID,
        version: crate::config::APP_VERSION,
        has_provider_key: ctx.config.has_provider_key(),
    })
}
