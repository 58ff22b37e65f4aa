//! Audit logging middleware.
//!
//! Logs method, path, status and latency of every API request. Bodies are
//! never logged: they carry patient data.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Response header echoing the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "api_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = Instant::now();
        let mut response = next.run(req).await;
        let status = response.status().as_u16();
        tracing::info!(status, elapsed_ms = %start.elapsed().as_millis(), "Request completed");

        if let Ok(val) = axum::http::HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, val);
        }
        response
    }
    .instrument(span)
    .await
}
