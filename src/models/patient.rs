use serde::Serialize;

use super::blood_gas::PlausibleRange;

/// Accepted patient weight (kg).
pub const WEIGHT_RANGE: PlausibleRange = PlausibleRange::new(0.5, 300.0);

/// Accepted clinician override for the transfusion target THbc (g/L).
pub const TARGET_THBC_RANGE: PlausibleRange = PlausibleRange::new(60.0, 150.0);

/// Patient-level inputs to weight-dependent dosing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub target_thbc: f64,
}

impl PatientContext {
    pub fn new(weight_kg: Option<f64>, target_thbc: f64) -> Self {
        Self {
            weight_kg,
            target_thbc,
        }
    }
}
