use super::thresholds::CorrectionConfig;
use super::types::{AlkalosisGuidance, AlkalosisManagement, AlkalosisSubtype};
use crate::models::{AnalysisRequest, Intubation};

/// Qualitative alkalosis guidance. Subtype is classified from HCO3- (actual,
/// falling back to standard) and PaCO2.
pub fn alkalosis_management(
    request: &AnalysisRequest,
    cfg: &CorrectionConfig,
) -> AlkalosisManagement {
    let reading = request.blood_gas();
    let Some(ph) = reading.ph() else {
        return AlkalosisManagement::InsufficientData {
            missing: vec!["ph"],
            reason: "pH is required to assess alkalosis".into(),
        };
    };
    if ph <= cfg.alkalosis_ph {
        return AlkalosisManagement::NotApplicable {
            reason: format!("pH {ph} is not above {}: no alkalemia", cfg.alkalosis_ph),
        };
    }

    let hco3 = reading.bicarbonate();
    let pco2 = reading.pco2();
    let metabolic = hco3.map(|v| v > cfg.metabolic_hco3);
    let respiratory = pco2.map(|v| v < cfg.respiratory_pco2);

    let subtype = match (metabolic, respiratory) {
        (Some(true), Some(true)) => AlkalosisSubtype::Mixed,
        (Some(true), _) => AlkalosisSubtype::Metabolic,
        (_, Some(true)) => AlkalosisSubtype::Respiratory,
        _ => AlkalosisSubtype::Undetermined,
    };

    let k_level = reading.potassium();
    let hypokalemic = k_level.is_some_and(|k| k < cfg.potassium_low);
    let intubation = request
        .anesthesia()
        .map(|a| a.intubation())
        .unwrap_or(Intubation::Unknown);

    let mut fluid_therapy = match subtype {
        AlkalosisSubtype::Metabolic | AlkalosisSubtype::Mixed => {
            "Restore volume and chloride with 0.9% saline; stop bicarbonate, citrate and \
             acetate loads and limit gastric losses."
                .to_string()
        }
        AlkalosisSubtype::Respiratory => {
            "No specific fluid therapy; treat the cause of hyperventilation.".to_string()
        }
        AlkalosisSubtype::Undetermined => {
            "HCO3- and PaCO2 do not identify the driver; repeat the blood gas before treating."
                .to_string()
        }
    };
    if hypokalemic {
        if let Some(k) = k_level {
            fluid_therapy.push_str(&format!(
                " Co-manage hypokalemia (K+ {k} mmol/L): replace potassium alongside volume."
            ));
        }
    }

    AlkalosisManagement::Indicated(AlkalosisGuidance {
        condition: condition_text(ph, hco3, pco2, cfg),
        subtype,
        k_level,
        fluid_therapy,
        ventilation_adjustment: ventilation_advice(subtype, intubation),
    })
}

fn condition_text(ph: f64, hco3: Option<f64>, pco2: Option<f64>, cfg: &CorrectionConfig) -> String {
    let mut parts = vec![format!("pH {ph} > {}", cfg.alkalosis_ph)];
    if let Some(h) = hco3 {
        parts.push(format!("HCO3- {h} mmol/L"));
    }
    if let Some(p) = pco2 {
        parts.push(format!("PaCO2 {p} mmHg"));
    }
    format!("alkalemia: {}", parts.join(", "))
}

fn ventilation_advice(subtype: AlkalosisSubtype, intubation: Intubation) -> Option<String> {
    let respiratory = matches!(subtype, AlkalosisSubtype::Respiratory | AlkalosisSubtype::Mixed);
    match (respiratory, intubation) {
        (true, Intubation::Yes) => Some(
            "Reduce minute ventilation (respiratory rate first, then tidal volume) targeting \
             PaCO2 35-45 mmHg."
                .into(),
        ),
        (true, Intubation::No) => Some(
            "Spontaneous ventilation: treat pain, anxiety or hypoxemia driving hyperventilation."
                .into(),
        ),
        (true, Intubation::Unknown) => Some(
            "If mechanically ventilated, reduce minute ventilation targeting PaCO2 35-45 mmHg; \
             otherwise treat the cause of hyperventilation."
                .into(),
        ),
        (false, Intubation::Yes) => Some(
            "Avoid hyperventilation; keep PaCO2 within 35-45 mmHg while the metabolic cause is \
             corrected."
                .into(),
        ),
        (false, _) => None,
    }
}
