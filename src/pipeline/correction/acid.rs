use super::thresholds::CorrectionConfig;
use super::types::{AcidCorrection, BicarbonateDose};
use crate::models::AnalysisRequest;

/// Sodium bicarbonate estimate for metabolic acidosis.
///
/// Indicated when pH and BE are both below their thresholds. Either value
/// at or above its threshold rules correction out; otherwise a missing pH or
/// BE leaves the criterion undecided. Dosing fails closed without weight.
pub fn acid_correction(request: &AnalysisRequest, cfg: &CorrectionConfig) -> AcidCorrection {
    let reading = request.blood_gas();
    let ph = reading.ph();
    let be = reading.base_excess();

    if let Some(ph) = ph.filter(|p| *p >= cfg.acidosis_ph) {
        return AcidCorrection::NotApplicable {
            reason: format!("pH {ph} is not below {}: no acidemia", cfg.acidosis_ph),
        };
    }
    if let Some(be) = be.filter(|b| *b >= cfg.acidosis_be) {
        return AcidCorrection::NotApplicable {
            reason: format!(
                "BE {be} mmol/L is not below {} mmol/L: no significant base deficit",
                cfg.acidosis_be
            ),
        };
    }

    let (Some(ph), Some(be)) = (ph, be) else {
        let mut missing = Vec::new();
        if ph.is_none() {
            missing.push("ph");
        }
        if be.is_none() {
            missing.push("be_ecf");
        }
        return AcidCorrection::InsufficientData {
            condition: "acidosis criterion cannot be evaluated".into(),
            missing,
            reason: "pH and base excess are both required to assess metabolic acidosis".into(),
        };
    };

    let condition = format!(
        "metabolic acidosis: pH {ph} < {} and BE {be} < {} mmol/L",
        cfg.acidosis_ph, cfg.acidosis_be
    );

    let Some(weight) = request.weight_kg() else {
        return AcidCorrection::InsufficientData {
            condition,
            missing: vec!["weight_kg"],
            reason: "insufficient data for dosing: patient weight is required".into(),
        };
    };

    let factor = cfg.bicarbonate_distribution_factor;
    let mmol = factor * weight * be.abs();
    let ml = mmol / cfg.nahco3_5pct_mmol_per_ml;
    let half_mmol = mmol / 2.0;
    let half_ml = ml / 2.0;

    AcidCorrection::Indicated(BicarbonateDose {
        condition,
        formula: format!("NaHCO3 (mmol) = {factor} × weight (kg) × |BE|"),
        base_excess: be,
        weight_kg: weight,
        distribution_factor: factor,
        sodium_bicarbonate_mmol: mmol,
        sodium_bicarbonate_5pct_ml: ml,
        initial_half_dose_mmol: half_mmol,
        initial_half_dose_ml: half_ml,
        basis: format!(
            "bicarbonate space {factor} L/kg; 5% NaHCO3 contains {} mmol/mL",
            cfg.nahco3_5pct_mmol_per_ml
        ),
        recommendation: format!(
            "Full calculated dose {mmol:.1} mmol ({ml:.1} mL of 5% NaHCO3). Give half first \
             ({half_mmol:.1} mmol, {half_ml:.1} mL) IV over 30-60 min, then repeat the blood gas \
             before further correction."
        ),
    })
}
