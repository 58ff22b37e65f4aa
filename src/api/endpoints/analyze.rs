//! Analysis endpoint: reviewed reading plus supplement form in, decision
//! response out.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::assembly::{assemble, RawAnalysisForm, ValidationError};
use crate::pipeline::correction::compute_corrections;
use crate::pipeline::decision::{compose, DecisionResponse};
use crate::pipeline::extraction::normalize_extraction;
use crate::pipeline::structuring::{
    build_analysis_prompt, StructuringError, ANALYSIS_SYSTEM_PROMPT,
};

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub decision: DecisionResponse,
}

#[derive(Default)]
struct AnalyzeFields {
    blood_gas_json: Option<String>,
    vital_signs_json: Option<String>,
    anesthesia_json: Option<String>,
    weight: Option<String>,
    target_thbc: Option<String>,
}

/// `POST /api/v1/analyze` with multipart `blood_gas_json` (required),
/// `vital_signs_json`, `anesthesia_json`, `weight`, `target_thbc`.
///
/// Input problems are rejected; a reasoning-model failure is not. The
/// deterministic corrections are always returned.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut fields = AnalyzeFields::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        let slot = match name.as_deref() {
            Some("blood_gas_json") => &mut fields.blood_gas_json,
            Some("vital_signs_json") => &mut fields.vital_signs_json,
            Some("anesthesia_json") => &mut fields.anesthesia_json,
            Some("weight") => &mut fields.weight,
            Some("target_thbc") => &mut fields.target_thbc,
            _ => continue,
        };
        *slot = Some(field.text().await?);
    }

    let blood_gas = fields
        .blood_gas_json
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("blood_gas_json is required".into()))?;
    let raw: Value = serde_json::from_str(blood_gas).map_err(|e| ValidationError::MalformedJson {
        field: "blood_gas_json",
        reason: e.to_string(),
    })?;
    if !raw.is_object() {
        return Err(ValidationError::NotAnObject {
            field: "blood_gas_json",
        }
        .into());
    }
    let reading = normalize_extraction(&raw);

    let form = RawAnalysisForm::from_json_fields(
        fields.vital_signs_json.as_deref(),
        fields.anesthesia_json.as_deref(),
        fields.weight,
        fields.target_thbc,
    )?;
    let request = assemble(reading, &form, &ctx.corrections)?;
    let corrections = compute_corrections(&request, &ctx.corrections);

    let reasoning = ctx.reasoning.clone();
    let model = reasoning.model_name().to_string();
    let prompt = build_analysis_prompt(&request);
    let start = std::time::Instant::now();
    let reply = tokio::task::spawn_blocking(move || {
        reasoning.generate(ANALYSIS_SYSTEM_PROMPT, &prompt)
    })
    .await
    .unwrap_or_else(|e| Err(StructuringError::HttpClient(format!("Task join error: {e}"))));
    tracing::info!(
        model = %model,
        ok = reply.is_ok(),
        elapsed_ms = %start.elapsed().as_millis(),
        "Reasoning model call finished"
    );

    let decision = compose(&request, corrections, reply, &model, &ctx.corrections);
    Ok(Json(AnalyzeResponse {
        success: true,
        decision,
    }))
}
