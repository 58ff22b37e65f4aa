use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Alert, FindingSeverity, Priority};
use crate::pipeline::correction::Corrections;

/// Attached to every response. A model-written disclaimer is never used.
pub const STANDARD_DISCLAIMER: &str = "This analysis is decision support only. It does not \
replace the judgment of the attending anesthesiologist, who remains responsible for every \
clinical decision.";

pub const SAFETY_WARNING: &str = "All doses and transfusion estimates are starting points \
computed from standard formulas. The clinician must adjust dynamically according to actual \
blood loss and circulatory fluctuation, and confirm with repeat blood gas analysis.";

/// Model-written interpretation. Every field is optional; the object itself
/// is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acid_base_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_disorder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensation_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygenation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_summary: Option<String>,
}

impl Assessment {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub category: String,
    pub parameter: String,
    pub value: String,
    pub reference_range: String,
    pub interpretation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<FindingSeverity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: String,
    pub priority: Priority,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Whether the reasoning model contributed to the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReasoningStatus {
    Complete { model: String },
    Degraded { reason: String },
}

impl ReasoningStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Uniformly shaped result of one analysis. Built once per call and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResponse {
    pub analysis_id: String,
    pub generated_at: DateTime<Utc>,
    pub assessment: Assessment,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<Alert>,
    #[serde(flatten)]
    pub corrections: Corrections,
    pub safety_warning: String,
    pub disclaimer: String,
    pub reasoning: ReasoningStatus,
}
