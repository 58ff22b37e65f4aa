use serde::Serialize;

use crate::models::BloodGasReading;

/// Confidence thresholds for reviewing an OCR reading
pub mod thresholds {
    /// Below this: reading likely unreliable, every value needs checking.
    pub const LOW: f32 = 0.50;

    /// Below this: some values may be misread.
    pub const MODERATE: f32 = 0.70;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

/// Classify the extractor's confidence. The sentinel 0 (not reported) is Low.
pub fn confidence_level(reading: &BloodGasReading) -> ConfidenceLevel {
    let c = reading.confidence;
    if c < thresholds::LOW {
        ConfidenceLevel::Low
    } else if c < thresholds::MODERATE {
        ConfidenceLevel::Moderate
    } else {
        ConfidenceLevel::High
    }
}

/// True when the clinician should be prompted to double-check the reading.
pub fn needs_review(reading: &BloodGasReading) -> bool {
    confidence_level(reading) != ConfidenceLevel::High || !reading.out_of_range.is_empty()
}
