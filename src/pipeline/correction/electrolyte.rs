use super::thresholds::CorrectionConfig;
use super::types::{Direction, ElectrolyteCorrection, ElectrolyteFinding, ElectrolyteSeverity};
use crate::models::AnalysisRequest;

/// Potassium and ionized calcium, each reported only outside its band.
pub fn electrolyte_correction(
    request: &AnalysisRequest,
    cfg: &CorrectionConfig,
) -> ElectrolyteCorrection {
    let reading = request.blood_gas();
    ElectrolyteCorrection {
        potassium: reading
            .potassium()
            .and_then(|k| potassium_finding(k, request.weight_kg(), cfg)),
        calcium: reading
            .ionized_calcium()
            .and_then(|ca| calcium_finding(ca, cfg)),
    }
}

fn potassium_finding(
    k: f64,
    weight: Option<f64>,
    cfg: &CorrectionConfig,
) -> Option<ElectrolyteFinding> {
    let normal_range = format!("{}-{} mmol/L", cfg.potassium_low, cfg.potassium_high);

    if k < cfg.potassium_low {
        let severity = if k < cfg.potassium_critical_low {
            ElectrolyteSeverity::Critical
        } else {
            ElectrolyteSeverity::Mild
        };
        let deficit =
            weight.map(|w| (cfg.potassium_target - k) * w * cfg.potassium_distribution_factor);
        let kcl_grams = deficit.map(|d| d / cfg.kcl_mmol_per_gram);
        let recommendation = match (deficit, kcl_grams) {
            (Some(d), Some(g)) => format!(
                "Hypokalemia: estimated K+ deficit {d:.1} mmol to reach {} mmol/L \
                 (about {g:.1} g KCl at {} mmol/g). Replace at no more than 10-20 mmol/h \
                 with ECG monitoring and recheck K+.",
                cfg.potassium_target, cfg.kcl_mmol_per_gram
            ),
            _ => "Hypokalemia: replace potassium with ECG monitoring and recheck K+. Patient \
                  weight is required to estimate the deficit."
                .to_string(),
        };
        return Some(ElectrolyteFinding {
            current: k,
            normal_range,
            direction: Direction::Low,
            severity,
            recommendation,
            estimated_deficit_mmol: deficit,
            kcl_grams,
        });
    }

    if k > cfg.potassium_high {
        let severity = if k > cfg.potassium_critical_high {
            ElectrolyteSeverity::Critical
        } else {
            ElectrolyteSeverity::Mild
        };
        let recommendation = match severity {
            ElectrolyteSeverity::Critical => {
                "Severe hyperkalemia: stop all potassium, give calcium for membrane \
                 stabilization, start insulin with glucose, correct acidosis and monitor ECG \
                 continuously."
            }
            ElectrolyteSeverity::Mild => {
                "Hyperkalemia: stop potassium-containing fluids, exclude hemolysis and recheck \
                 K+; treat if rising or ECG changes appear."
            }
        };
        return Some(ElectrolyteFinding {
            current: k,
            normal_range,
            direction: Direction::High,
            severity,
            recommendation: recommendation.into(),
            estimated_deficit_mmol: None,
            kcl_grams: None,
        });
    }

    None
}

fn calcium_finding(ca: f64, cfg: &CorrectionConfig) -> Option<ElectrolyteFinding> {
    let normal_range = format!("{}-{} mmol/L", cfg.calcium_low, cfg.calcium_high);

    let (direction, severity, recommendation) = if ca < cfg.calcium_low {
        let severity = if ca < cfg.calcium_critical_low {
            ElectrolyteSeverity::Critical
        } else {
            ElectrolyteSeverity::Mild
        };
        (
            Direction::Low,
            severity,
            format!(
                "Hypocalcemia: give 10% calcium gluconate 1 g (about {} mmol Ca2+) slowly IV \
                 and recheck ionized calcium; consider citrate load after massive transfusion.",
                cfg.calcium_gluconate_mmol_per_gram
            ),
        )
    } else if ca > cfg.calcium_high {
        let severity = if ca > cfg.calcium_critical_high {
            ElectrolyteSeverity::Critical
        } else {
            ElectrolyteSeverity::Mild
        };
        (
            Direction::High,
            severity,
            "Hypercalcemia: stop calcium supplementation, ensure adequate hydration and \
             recheck ionized calcium."
                .to_string(),
        )
    } else {
        return None;
    };

    Some(ElectrolyteFinding {
        current: ca,
        normal_range,
        direction,
        severity,
        recommendation,
        estimated_deficit_mmol: None,
        kcl_grams: None,
    })
}
