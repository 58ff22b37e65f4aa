use serde::Serialize;

use super::enums::AlertLevel;

/// A clinician-facing alert in the decision response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<AlertLevel>,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recommendation: None,
            level: Some(level),
        }
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}
