use serde::Serialize;

use super::enums::{AnesthesiaType, Intubation};
use super::form_value::FormValue;

/// Anesthesia technique: a recognized type, or the clinician's own wording.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnesthesiaKind {
    Known(AnesthesiaType),
    Other(String),
}

impl AnesthesiaKind {
    /// Recognize a label; unrecognized text is kept verbatim (trimmed).
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match AnesthesiaType::from_label(trimmed) {
            Some(kind) => Self::Known(kind),
            None => Self::Other(trimmed.to_string()),
        })
    }

    pub fn known(&self) -> Option<AnesthesiaType> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Other(_) => None,
        }
    }
}

/// Anesthesia and surgical context supplied on the supplement form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnesthesiaContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anesthesia_type: Option<AnesthesiaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intubated: Option<Intubation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fluid_input_ml: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_loss_ml: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urine_output_ml: Option<FormValue>,
}

impl AnesthesiaContext {
    pub fn is_empty(&self) -> bool {
        self.anesthesia_type.is_none()
            && self.intubated.is_none()
            && self.medications.is_none()
            && self.notes.is_none()
            && self.surgery_type.is_none()
            && self.position.is_none()
            && self.fluid_input_ml.is_none()
            && self.blood_loss_ml.is_none()
            && self.urine_output_ml.is_none()
    }

    /// Intubation status, `Unknown` when not supplied.
    pub fn intubation(&self) -> Intubation {
        self.intubated.unwrap_or(Intubation::Unknown)
    }
}
