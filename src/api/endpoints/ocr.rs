//! Report OCR endpoint: photographed blood-gas report in, reading out.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::BloodGasReading;
use crate::pipeline::assembly::parse_weight;
use crate::pipeline::extraction::{
    confidence_level, needs_review, ConfidenceLevel, ExtractionError, ReportReader,
};

#[derive(Serialize)]
pub struct OcrResponse {
    pub success: bool,
    pub ocr_result: BloodGasReading,
    pub confidence_level: ConfidenceLevel,
    /// Low confidence or implausible values were seen; prompt a careful review.
    pub needs_review: bool,
    pub weight: Option<f64>,
}

/// `POST /api/v1/ocr` with multipart `file` (JPEG/PNG), optional `weight`.
///
/// The weight is validated and echoed back so the client can carry it into
/// the supplement stage.
pub async fn extract(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut weight: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => image = Some(field.bytes().await?.to_vec()),
            Some("weight") => weight = Some(field.text().await?),
            _ => {}
        }
    }

    let image = image.ok_or(ExtractionError::EmptyUpload)?;
    let weight = parse_weight(weight.as_deref())?;

    let reader = ReportReader::new(ctx.vision.clone(), ctx.config.max_upload_bytes);
    let reading = tokio::task::spawn_blocking(move || reader.read(&image)).await??;

    Ok(Json(OcrResponse {
        success: true,
        confidence_level: confidence_level(&reading),
        needs_review: needs_review(&reading),
        ocr_result: reading,
        weight,
    }))
}
