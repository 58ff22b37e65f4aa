//! Deterministic correction engine.
//!
//! Pure functions of the analysis request and a [`CorrectionConfig`]: no I/O,
//! no clock, no randomness. Identical input yields bit-identical output, and
//! nothing a reasoning model returns can change these figures.

pub mod acid;
pub mod alkalosis;
pub mod electrolyte;
pub mod thresholds;
pub mod transfusion;
pub mod types;

pub use acid::*;
pub use alkalosis::*;
pub use electrolyte::*;
pub use thresholds::*;
pub use transfusion::*;
pub use types::*;

use crate::models::{Alert, AlertLevel, AnalysisRequest};

/// Run every sub-engine on one request.
pub fn compute_corrections(request: &AnalysisRequest, cfg: &CorrectionConfig) -> Corrections {
    Corrections {
        acid_correction: acid_correction(request, cfg),
        alkalosis_management: alkalosis_management(request, cfg),
        transfusion_guidance: transfusion_guidance(request, cfg),
        electrolyte_correction: electrolyte_correction(request, cfg),
    }
}

/// Alerts derived from the engine output, independent of any model reply.
///
/// Order: critical electrolytes, severe acidemia, missing weight.
pub fn correction_alerts(
    request: &AnalysisRequest,
    corrections: &Corrections,
    cfg: &CorrectionConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let electrolytes = &corrections.electrolyte_correction;
    if let Some(k) = electrolytes
        .potassium
        .as_ref()
        .filter(|f| f.severity == ElectrolyteSeverity::Critical)
    {
        let label = match k.direction {
            Direction::Low => "hypokalemia",
            Direction::High => "hyperkalemia",
        };
        alerts.push(
            Alert::new(
                AlertLevel::Warning,
                format!("Critical {label}: K+ {} mmol/L", k.current),
            )
            .with_recommendation(k.recommendation.clone()),
        );
    }
    if let Some(ca) = electrolytes
        .calcium
        .as_ref()
        .filter(|f| f.severity == ElectrolyteSeverity::Critical)
    {
        let label = match ca.direction {
            Direction::Low => "hypocalcemia",
            Direction::High => "hypercalcemia",
        };
        alerts.push(
            Alert::new(
                AlertLevel::Warning,
                format!("Critical {label}: ionized Ca2+ {} mmol/L", ca.current),
            )
            .with_recommendation(ca.recommendation.clone()),
        );
    }

    if let Some(ph) = request
        .blood_gas()
        .ph()
        .filter(|ph| *ph < cfg.severe_acidemia_ph)
    {
        alerts.push(
            Alert::new(AlertLevel::Warning, format!("Severe acidemia: pH {ph}"))
                .with_recommendation(
                    "Identify and treat the cause; secure ventilation and circulation before \
                     buffer therapy.",
                ),
        );
    }

    if dosing_blocked_by_weight(corrections) {
        alerts.push(
            Alert::new(
                AlertLevel::Caution,
                "Patient weight missing: weight-based doses were not calculated",
            )
            .with_recommendation("Enter the patient's weight to obtain dose estimates."),
        );
    }

    alerts
}

fn dosing_blocked_by_weight(corrections: &Corrections) -> bool {
    let acid = matches!(
        &corrections.acid_correction,
        AcidCorrection::InsufficientData { missing, .. } if missing.contains(&"weight_kg")
    );
    let transfusion = corrections
        .transfusion_guidance
        .as_ref()
        .is_some_and(|t| matches!(t.prbc, PrbcEstimate::InsufficientData { .. }));
    let potassium = corrections
        .electrolyte_correction
        .potassium
        .as_ref()
        .is_some_and(|k| k.direction == Direction::Low && k.estimated_deficit_mmol.is_none());
    acid || transfusion || potassium
}
