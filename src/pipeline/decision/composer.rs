use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::parser::{parse_reasoning_reply, ReasoningReply};
use super::types::{DecisionResponse, ReasoningStatus, SAFETY_WARNING, STANDARD_DISCLAIMER};
use crate::models::AnalysisRequest;
use crate::pipeline::correction::{correction_alerts, CorrectionConfig, Corrections};
use crate::pipeline::structuring::StructuringError;

/// Hex characters kept from the request digest.
const ANALYSIS_ID_LEN: usize = 16;

/// Build the response for one analysis. Never fails: a missing, failed or
/// malformed reasoning reply still yields the complete shape with
/// `reasoning: degraded`.
pub fn compose(
    request: &AnalysisRequest,
    corrections: Corrections,
    reply: Result<String, StructuringError>,
    model: &str,
    cfg: &CorrectionConfig,
) -> DecisionResponse {
    compose_at(request, corrections, reply, model, cfg, Utc::now())
}

/// [`compose`] with an explicit timestamp.
pub fn compose_at(
    request: &AnalysisRequest,
    corrections: Corrections,
    reply: Result<String, StructuringError>,
    model: &str,
    cfg: &CorrectionConfig,
    generated_at: DateTime<Utc>,
) -> DecisionResponse {
    let (parsed, reasoning) = match reply {
        Ok(text) => match parse_reasoning_reply(&text) {
            Ok(parsed) => (
                parsed,
                ReasoningStatus::Complete {
                    model: model.to_string(),
                },
            ),
            Err(e) => {
                tracing::warn!(error = %e, model, "Unusable reasoning reply");
                (ReasoningReply::default(), unparseable_reply())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, model, "Reasoning model unavailable");
            (ReasoningReply::default(), degraded_by_provider(&e))
        }
    };

    let mut alerts = correction_alerts(request, &corrections, cfg);
    alerts.extend(parsed.alerts);

    DecisionResponse {
        analysis_id: analysis_id(request),
        generated_at,
        assessment: parsed.assessment,
        findings: parsed.findings,
        recommendations: parsed.recommendations,
        alerts,
        corrections,
        safety_warning: SAFETY_WARNING.to_string(),
        disclaimer: STANDARD_DISCLAIMER.to_string(),
        reasoning,
    }
}

/// Truncated SHA-256 of the serialized request.
pub fn analysis_id(request: &AnalysisRequest) -> String {
    let serialized = serde_json::to_vec(request).unwrap_or_default();
    let digest = Sha256::digest(&serialized);
    let mut hex = String::with_capacity(ANALYSIS_ID_LEN);
    for byte in digest.iter().take(ANALYSIS_ID_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

fn unparseable_reply() -> ReasoningStatus {
    ReasoningStatus::Degraded {
        reason: "AI interpretation could not be parsed".to_string(),
    }
}

/// Client-facing reason; provider bodies and connection details stay in the log.
fn degraded_by_provider(err: &StructuringError) -> ReasoningStatus {
    let reason = match err {
        StructuringError::MissingApiKey => "AI service is not configured",
        StructuringError::Timeout(_) => "AI service timed out",
        StructuringError::ProviderConnection(_) | StructuringError::HttpClient(_) => {
            "AI service is unreachable"
        }
        StructuringError::ProviderError { .. } => "AI service returned an error",
        StructuringError::EmptyResponse | StructuringError::ResponseParsing(_) => {
            "AI service returned no usable content"
        }
    };
    ReasoningStatus::Degraded {
        reason: reason.to_string(),
    }
}
