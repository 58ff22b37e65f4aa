use super::thresholds::CorrectionConfig;
use super::types::{PrbcEstimate, TransfusionGuidance};
use crate::models::AnalysisRequest;

/// PRBC estimate against the patient's transfusion target. `None` when THbc
/// was not measured.
pub fn transfusion_guidance(
    request: &AnalysisRequest,
    cfg: &CorrectionConfig,
) -> Option<TransfusionGuidance> {
    let current = request.blood_gas().thbc()?;
    let target = request.patient().target_thbc;
    let deficit = (target - current).max(0.0);

    let prbc = if deficit == 0.0 {
        PrbcEstimate::NotRequired
    } else {
        match request.weight_kg() {
            None => PrbcEstimate::InsufficientData {
                reason: "insufficient data for dosing: patient weight is required to estimate \
                         the Hb rise per unit"
                    .into(),
            },
            Some(weight) => {
                let rise = cfg.prbc_rise_per_unit * cfg.prbc_reference_weight_kg / weight;
                PrbcEstimate::Estimated {
                    units: (deficit / rise).ceil() as u32,
                    hb_rise_per_unit: rise,
                    formula: format!(
                        "units = ceil(deficit / ({} × {} / weight (kg)))",
                        cfg.prbc_rise_per_unit, cfg.prbc_reference_weight_kg
                    ),
                    weight_kg: weight,
                }
            }
        }
    };

    let condition = if deficit == 0.0 {
        format!("THbc {current} g/L at or above target {target} g/L")
    } else {
        format!("THbc {current} g/L below target {target} g/L")
    };

    let mut clinical_reminders = vec![
        "Weigh transfusion against ongoing blood loss, hemodynamic stability and coagulation \
         status; the estimate is not an order."
            .to_string(),
        "Recheck THbc after each unit or after significant further blood loss.".to_string(),
    ];
    if let Some(loss) = request
        .anesthesia()
        .and_then(|a| a.blood_loss_ml.as_ref())
        .and_then(|v| v.as_number())
    {
        clinical_reminders.push(format!(
            "Recorded blood loss {loss} mL: THbc may lag behind acute loss until volume is restored."
        ));
    }

    Some(TransfusionGuidance {
        condition,
        current_thbc: current,
        target_thbc: target,
        hemoglobin_deficit: deficit,
        prbc,
        clinical_reminders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnesthesiaContext, BloodGasField, BloodGasReading, FormValue, PatientContext,
    };

    fn request(thbc: Option<f64>, weight: Option<f64>, target: f64) -> AnalysisRequest {
        let mut reading = BloodGasReading::default().with(BloodGasField::Ph, 7.38);
        if let Some(t) = thbc {
            reading = reading.with(BloodGasField::Thbc, t);
        }
        AnalysisRequest::from_parts(reading, None, None, PatientContext::new(weight, target))
    }

    fn guidance(
        thbc: Option<f64>,
        weight: Option<f64>,
        target: f64,
    ) -> Option<TransfusionGuidance> {
        transfusion_guidance(&request(thbc, weight, target), &CorrectionConfig::default())
    }

    #[test]
    fn absent_thbc_yields_no_guidance() {
        assert!(guidance(None, Some(70.0), 100.0).is_none());
    }

    #[test]
    fn reference_weight_gives_seven_per_unit() {
        let g = guidance(Some(65.0), Some(70.0), 100.0).unwrap();
        assert_eq!(g.hemoglobin_deficit, 35.0);
        match g.prbc {
            PrbcEstimate::Estimated { units, hb_rise_per_unit, .. } => {
                assert_eq!(hb_rise_per_unit, 7.0);
                assert_eq!(units, 5);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn partial_unit_rounds_up() {
        let g = guidance(Some(90.0), Some(70.0), 100.0).unwrap();
        assert!(matches!(g.prbc, PrbcEstimate::Estimated { units: 2, .. }));
    }

    #[test]
    fn lighter_patient_needs_fewer_units() {
        let g = guidance(Some(65.0), Some(35.0), 100.0).unwrap();
        match g.prbc {
            PrbcEstimate::Estimated { units, hb_rise_per_unit, .. } => {
                assert_eq!(hb_rise_per_unit, 14.0);
                assert_eq!(units, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn at_target_is_not_required() {
        let g = guidance(Some(112.0), None, 100.0).unwrap();
        assert_eq!(g.hemoglobin_deficit, 0.0);
        assert_eq!(g.prbc, PrbcEstimate::NotRequired);
    }

    #[test]
    fn deficit_without_weight_is_insufficient_data() {
        let g = guidance(Some(70.0), None, 100.0).unwrap();
        assert_eq!(g.hemoglobin_deficit, 30.0);
        assert!(matches!(g.prbc, PrbcEstimate::InsufficientData { .. }));
    }

    #[test]
    fn clinician_target_is_respected() {
        let g = guidance(Some(75.0), Some(70.0), 80.0).unwrap();
        assert_eq!(g.target_thbc, 80.0);
        assert_eq!(g.hemoglobin_deficit, 5.0);
        assert!(matches!(g.prbc, PrbcEstimate::Estimated { units: 1, .. }));
    }

    #[test]
    fn recorded_blood_loss_adds_reminder() {
        let reading = BloodGasReading::default().with(BloodGasField::Thbc, 80.0);
        let anesthesia = AnesthesiaContext {
            blood_loss_ml: Some(FormValue::Number(1200.0)),
            ..Default::default()
        };
        let req = AnalysisRequest::from_parts(
            reading,
            None,
            Some(anesthesia),
            PatientContext::new(Some(70.0), 100.0),
        );
        let g = transfusion_guidance(&req, &CorrectionConfig::default()).unwrap();
        assert!(g.clinical_reminders.iter().any(|r| r.contains("1200 mL")));
    }

    #[test]
    fn serialized_estimate_is_tagged() {
        let g = guidance(Some(65.0), Some(70.0), 100.0).unwrap();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["prbc"]["status"], "estimated");
        assert_eq!(json["prbc"]["units"], 5);
    }
}
