//! API router.
//!
//! Returns a composable `Router` with every route under `/api/v1/`.
//!
//! Layers (outermost → innermost):
//! 1. CORS (any origin) → 2. Audit logger → 3. Body limit

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Headroom above `max_upload_bytes` for multipart framing and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the API router.
///
/// The image size limit itself is enforced by the OCR stage with a precise
/// error; the body limit only stops grossly oversized requests early.
pub fn api_router(ctx: ApiContext) -> Router {
    let body_limit = ctx
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/ocr", post(endpoints::ocr::extract))
        .route("/analyze", post(endpoints::analyze::analyze))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new().nest("/api/v1", routes).layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use image::{DynamicImage, ImageOutputFormat};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::pipeline::structuring::{MockLlmClient, StructuringError};

    const BOUNDARY: &str = "anesguard-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part<'_>]) -> Body {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"report.png\"\r\nContent-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn post(path: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(parts))
            .unwrap()
    }

    fn app(vision: MockLlmClient, reasoning: MockLlmClient) -> Router {
        let config = AppConfig {
            gemini_api_key: Some("test-key".into()),
            ..AppConfig::default()
        };
        api_router(ApiContext::with_clients(
            config,
            Arc::new(vision),
            Arc::new(reasoning),
        ))
    }

    fn default_app() -> Router {
        app(MockLlmClient::new("{}"), MockLlmClient::new("{}"))
    }

    fn png() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(4, 4)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const REASONING_REPLY: &str = r#"{
        "assessment": {"primary_disorder": "Metabolic acidosis", "risk_level": "high"},
        "findings": [{"parameter": "pH", "value": "7.25", "interpretation": "Acidemia"}],
        "recommendations": [{"action": "Repeat ABG in 30 minutes", "priority": "high", "detail": ""}],
        "alerts": []
    }"#;

    #[tokio::test]
    async fn health_reports_service() {
        let req = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "blood-gas-analyzer");
        assert_eq!(json["has_provider_key"], true);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let req = Request::builder()
            .uri("/api/v1/nothing")
            .body(Body::empty())
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let req = Request::builder()
            .uri("/api/v1/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn ocr_returns_normalized_reading() {
        let vision = MockLlmClient::new(
            "```json\n{\"pH\": \"7.31\", \"PaCO2\": 48, \"K\": 0, \"lac\": \"n/a\", \"confidence\": 0.92}\n```",
        );
        let image = png();
        let req = post(
            "/api/v1/ocr",
            &[Part::File("file", &image), Part::Text("weight", "72.5")],
        );
        let response = app(vision, MockLlmClient::new("{}"))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["weight"], 72.5);
        assert_eq!(json["confidence_level"], "high");
        // K 0 is implausible and lands in out_of_range.
        assert_eq!(json["needs_review"], true);
        assert_eq!(json["ocr_result"]["ph"], 7.31);
        assert_eq!(json["ocr_result"]["pco2"], 48.0);
        assert!(json["ocr_result"].get("lac").is_none());
        let missing = json["ocr_result"]["missing_fields"].as_array().unwrap();
        assert!(missing.iter().any(|f| f == "lac"));
    }

    #[tokio::test]
    async fn ocr_without_file_is_rejected() {
        let req = post("/api/v1/ocr", &[Part::Text("weight", "70")]);
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "EMPTY_UPLOAD");
    }

    #[tokio::test]
    async fn ocr_rejects_non_image() {
        let req = post("/api/v1/ocr", &[Part::File("file", b"%PDF-1.7 not an image")]);
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn ocr_provider_failure_is_502() {
        let vision = MockLlmClient::failing(StructuringError::ProviderConnection(
            "connection refused".into(),
        ));
        let image = png();
        let req = post("/api/v1/ocr", &[Part::File("file", &image)]);
        let response = app(vision, MockLlmClient::new("{}"))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn ocr_with_nothing_recognized_is_422() {
        let vision = MockLlmClient::new(r#"{"ph": null, "confidence": 0.1}"#);
        let image = png();
        let req = post("/api/v1/ocr", &[Part::File("file", &image)]);
        let response = app(vision, MockLlmClient::new("{}"))
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn analyze_returns_corrections_and_assessment() {
        let reasoning = MockLlmClient::new(REASONING_REPLY).with_model("gemini-test");
        let req = post(
            "/api/v1/analyze",
            &[
                Part::Text("blood_gas_json", r#"{"ph": 7.20, "be_ecf": -10, "k": 3.0}"#),
                Part::Text("weight", "70"),
                Part::Text("vital_signs_json", r#"{"heart_rate": "88", "spo2": ""}"#),
                Part::Text(
                    "anesthesia_json",
                    r#"{"anesthesia_type": "general", "intubated": "yes"}"#,
                ),
            ],
        );
        let response = app(MockLlmClient::new("{}"), reasoning)
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["reasoning"]["status"], "complete");
        assert_eq!(json["reasoning"]["model"], "gemini-test");
        assert_eq!(json["assessment"]["primary_disorder"], "Metabolic acidosis");
        assert_eq!(json["acid_correction"]["status"], "indicated");
        assert_eq!(json["acid_correction"]["sodium_bicarbonate_mmol"], 210.0);
        assert!(json["electrolyte_correction"]["potassium"].is_object());
        assert!(json.get("transfusion_guidance").is_none());
        assert_eq!(json["analysis_id"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn analyze_degrades_when_model_fails() {
        let reasoning = MockLlmClient::failing(StructuringError::Timeout(120));
        let req = post(
            "/api/v1/analyze",
            &[Part::Text("blood_gas_json", r#"{"ph": 7.40, "thbc": 85}"#)],
        );
        let response = app(MockLlmClient::new("{}"), reasoning)
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["reasoning"]["status"], "degraded");
        assert_eq!(json["assessment"], serde_json::json!({}));
        assert_eq!(json["transfusion_guidance"]["prbc"]["status"], "insufficient_data");
        assert!(json["disclaimer"].as_str().unwrap().len() > 10);
    }

    #[tokio::test]
    async fn analyze_requires_blood_gas_json() {
        let req = post("/api/v1/analyze", &[Part::Text("weight", "70")]);
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn analyze_rejects_malformed_json() {
        let req = post(
            "/api/v1/analyze",
            &[Part::Text("blood_gas_json", "{\"ph\": 7.3")],
        );
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn analyze_rejects_empty_report() {
        let req = post(
            "/api/v1/analyze",
            &[Part::Text("blood_gas_json", r#"{"ph": "", "k": null}"#)],
        );
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_rejects_bad_weight() {
        let req = post(
            "/api/v1/analyze",
            &[
                Part::Text("blood_gas_json", r#"{"ph": 7.30}"#),
                Part::Text("weight", "seventy"),
            ],
        );
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn analyze_rejects_implausible_potassium() {
        let req = post(
            "/api/v1/analyze",
            &[
                Part::Text("blood_gas_json", r#"{"ph": 7.20, "be_ecf": -10, "k": 65}"#),
                Part::Text("weight", "70"),
            ],
        );
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("k value 65"), "{message}");
    }

    #[tokio::test]
    async fn analyze_rejects_unreviewed_ocr_flag() {
        let reading = r#"{"ph": 7.31, "out_of_range": [{"field": "k", "value": 0}]}"#;
        let req = post("/api/v1/analyze", &[Part::Text("blood_gas_json", reading)]);
        let response = default_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }
}
