use serde::Deserialize;
use serde_json::Value;

use super::types::{Assessment, Finding, Recommendation};
use super::CompositionError;
use crate::models::{Alert, AlertLevel, FindingSeverity, Priority};
use crate::pipeline::structuring::isolate_json_object;

/// Keys a model may emit that the service owns.
const ENGINE_OWNED_KEYS: &[&str] = &[
    "acid_correction",
    "alkalosis_management",
    "transfusion_guidance",
    "electrolyte_correction",
    "safety_warning",
    "disclaimer",
];

/// The usable parts of a reasoning model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningReply {
    pub assessment: Assessment,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<Alert>,
}

/// Parse the reasoning model's reply.
///
/// The reply must contain a JSON object. Assessment fields are taken one by
/// one (non-strings dropped) and list items that do not fit are skipped.
pub fn parse_reasoning_reply(reply: &str) -> Result<ReasoningReply, CompositionError> {
    let value: Value = serde_json::from_str(isolate_json_object(reply))
        .map_err(|e| CompositionError::InvalidJson(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(CompositionError::NotAnObject);
    };

    let ignored = ENGINE_OWNED_KEYS
        .iter()
        .filter(|k| obj.contains_key(**k))
        .count();
    if ignored > 0 {
        tracing::debug!(ignored, "Model-supplied correction fields ignored");
    }

    let findings: Vec<Finding> = parse_array_lenient::<RawFinding>(obj.get("findings"))
        .into_iter()
        .filter_map(RawFinding::into_finding)
        .collect();
    let recommendations: Vec<Recommendation> =
        parse_array_lenient::<RawRecommendation>(obj.get("recommendations"))
            .into_iter()
            .filter_map(RawRecommendation::into_recommendation)
            .collect();
    let alerts: Vec<Alert> = parse_array_lenient::<RawAlert>(obj.get("alerts"))
        .into_iter()
        .filter_map(RawAlert::into_alert)
        .collect();

    Ok(ReasoningReply {
        assessment: parse_assessment(obj.get("assessment")),
        findings,
        recommendations,
        alerts,
    })
}

fn parse_assessment(raw: Option<&Value>) -> Assessment {
    let Some(Value::Object(obj)) = raw else {
        return Assessment::default();
    };
    let field = |key: &str| obj.get(key).and_then(text_field);
    Assessment {
        acid_base_status: field("acid_base_status"),
        primary_disorder: field("primary_disorder"),
        compensation_status: field("compensation_status"),
        severity: field("severity"),
        oxygenation: field("oxygenation"),
        risk_level: field("risk_level"),
        clinical_summary: field("clinical_summary"),
    }
}

/// Non-empty trimmed string; any other JSON type is dropped.
fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse an array leniently, skipping items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: Option<&Value>) -> Vec<T> {
    match items {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
        _ => vec![],
    }
}

/// A scalar rendered as text: models sometimes emit numbers where text is asked.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> Option<String> {
        let s = match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        };
        (!s.is_empty()).then_some(s)
    }
}

fn opt_text(s: Option<Scalar>) -> Option<String> {
    s.and_then(Scalar::into_text)
}

#[derive(Deserialize)]
struct RawFinding {
    category: Option<Scalar>,
    parameter: Option<Scalar>,
    value: Option<Scalar>,
    reference_range: Option<Scalar>,
    interpretation: Option<Scalar>,
    severity: Option<Scalar>,
}

impl RawFinding {
    /// A finding needs at least a parameter or an interpretation.
    fn into_finding(self) -> Option<Finding> {
        let parameter = opt_text(self.parameter);
        let interpretation = opt_text(self.interpretation);
        if parameter.is_none() && interpretation.is_none() {
            return None;
        }
        Some(Finding {
            category: opt_text(self.category).unwrap_or_default(),
            parameter: parameter.unwrap_or_default(),
            value: opt_text(self.value).unwrap_or_default(),
            reference_range: opt_text(self.reference_range).unwrap_or_default(),
            interpretation: interpretation.unwrap_or_default(),
            severity: opt_text(self.severity)
                .as_deref()
                .and_then(FindingSeverity::from_label),
        })
    }
}

#[derive(Deserialize)]
struct RawRecommendation {
    action: Option<Scalar>,
    priority: Option<Scalar>,
    detail: Option<Scalar>,
    category: Option<Scalar>,
    rationale: Option<Scalar>,
}

impl RawRecommendation {
    /// Unknown or missing priority is treated as medium.
    fn into_recommendation(self) -> Option<Recommendation> {
        let action = opt_text(self.action)?;
        Some(Recommendation {
            action,
            priority: opt_text(self.priority)
                .as_deref()
                .and_then(Priority::from_label)
                .unwrap_or(Priority::Medium),
            detail: opt_text(self.detail).unwrap_or_default(),
            category: opt_text(self.category),
            rationale: opt_text(self.rationale),
        })
    }
}

/// Alerts arrive either as objects or as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlert {
    Message(String),
    Full {
        message: Option<Scalar>,
        recommendation: Option<Scalar>,
        level: Option<Scalar>,
    },
}

impl RawAlert {
    fn into_alert(self) -> Option<Alert> {
        match self {
            RawAlert::Message(message) => {
                let message = message.trim();
                (!message.is_empty()).then(|| Alert {
                    message: message.to_string(),
                    recommendation: None,
                    level: None,
                })
            }
            RawAlert::Full {
                message,
                recommendation,
                level,
            } => Some(Alert {
                message: opt_text(message)?,
                recommendation: opt_text(recommendation),
                level: opt_text(level).as_deref().and_then(AlertLevel::from_label),
            }),
        }
    }
}
