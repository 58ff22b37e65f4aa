use serde::Serialize;

use super::anesthesia::AnesthesiaContext;
use super::blood_gas::BloodGasReading;
use super::patient::PatientContext;
use super::vital_sign::VitalSigns;

/// Validated input to one analysis attempt.
///
/// Built only by the request assembler and immutable afterwards. Optional
/// groups that carried no field are `None` and are left out of the
/// serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    blood_gas: BloodGasReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    vital_signs: Option<VitalSigns>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anesthesia: Option<AnesthesiaContext>,
    patient: PatientContext,
}

impl AnalysisRequest {
    pub(crate) fn from_parts(
        blood_gas: BloodGasReading,
        vital_signs: Option<VitalSigns>,
        anesthesia: Option<AnesthesiaContext>,
        patient: PatientContext,
    ) -> Self {
        Self {
            blood_gas,
            vital_signs: vital_signs.filter(|v| !v.is_empty()),
            anesthesia: anesthesia.filter(|a| !a.is_empty()),
            patient,
        }
    }

    pub fn blood_gas(&self) -> &BloodGasReading {
        &self.blood_gas
    }

    pub fn vital_signs(&self) -> Option<&VitalSigns> {
        self.vital_signs.as_ref()
    }

    pub fn anesthesia(&self) -> Option<&AnesthesiaContext> {
        self.anesthesia.as_ref()
    }

    pub fn patient(&self) -> &PatientContext {
        &self.patient
    }

    pub fn weight_kg(&self) -> Option<f64> {
        self.patient.weight_kg
    }
}
