use serde_json::{Map, Value};

use super::ValidationError;
use crate::models::{
    AnesthesiaContext, AnesthesiaKind, FormValue, Intubation, VitalSigns, VitalType,
};

/// Raw supplement-stage inputs exactly as submitted.
///
/// Group fields hold the decoded JSON objects; scalar fields hold the text
/// as typed. Nothing is interpreted until [`assemble`](super::assemble).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAnalysisForm {
    pub vital_signs: Option<Map<String, Value>>,
    pub anesthesia: Option<Map<String, Value>>,
    pub weight: Option<String>,
    pub target_thbc: Option<String>,
}

impl RawAnalysisForm {
    /// Decode the JSON-encoded group fields of a submitted form.
    ///
    /// Blank group fields are treated as absent.
    pub fn from_json_fields(
        vital_signs_json: Option<&str>,
        anesthesia_json: Option<&str>,
        weight: Option<String>,
        target_thbc: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            vital_signs: decode_group(vital_signs_json, "vital_signs_json")?,
            anesthesia: decode_group(anesthesia_json, "anesthesia_json")?,
            weight,
            target_thbc,
        })
    }
}

/// Decode a JSON object field. `null` and blank input are absent.
pub fn decode_group(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<Map<String, Value>>, ValidationError> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(text).map_err(|e| ValidationError::MalformedJson {
        field,
        reason: e.to_string(),
    })?;
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ValidationError::NotAnObject { field }),
    }
}

/// Parse the vital-signs group. Unknown keys are ignored; numeric values
/// outside the accepted range are rejected, as are aliases of one vital
/// carrying different values.
pub fn parse_vital_signs(raw: &Map<String, Value>) -> Result<VitalSigns, ValidationError> {
    let mut vitals = VitalSigns::default();
    for (key, value) in raw {
        let Some(kind) = VitalType::from_str(&key.trim().to_lowercase()) else {
            tracing::debug!(field = %key, "Ignoring unknown vital-sign field");
            continue;
        };
        let Some(parsed) = FormValue::parse(value) else {
            continue;
        };
        match &parsed {
            FormValue::Number(v) => {
                let range = kind.accepted_range();
                if !range.contains(*v) {
                    return Err(ValidationError::OutOfRange {
                        field: kind.as_str(),
                        value: *v,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
            FormValue::Text(_) => {
                tracing::debug!(field = kind.as_str(), "Vital sign kept as free text");
            }
        }
        if let Some(existing) = vitals.get(kind) {
            if *existing != parsed {
                return Err(ValidationError::ConflictingValues {
                    field: kind.as_str(),
                });
            }
        }
        vitals.set(kind, parsed);
    }
    Ok(vitals)
}

/// Parse the anesthesia group. Empty values are omitted; an unrecognized
/// anesthesia type is kept verbatim.
pub fn parse_anesthesia(raw: &Map<String, Value>) -> AnesthesiaContext {
    let text = |key: &str| raw.get(key).and_then(free_text);
    let number = |key: &str| -> Option<FormValue> {
        let parsed = raw.get(key).and_then(FormValue::parse)?;
        if parsed.is_text() {
            tracing::debug!(field = key, "Anesthesia quantity kept as free text");
        }
        Some(parsed)
    };

    let intubated = text("intubated").map(|label| {
        Intubation::from_label(&label).unwrap_or_else(|| {
            tracing::warn!("Unrecognized intubation status, treating as unknown");
            Intubation::Unknown
        })
    });

    AnesthesiaContext {
        anesthesia_type: text("anesthesia_type").and_then(|l| AnesthesiaKind::from_label(&l)),
        intubated,
        medications: text("medications"),
        notes: text("notes"),
        surgery_type: text("surgery_type"),
        position: text("position"),
        fluid_input_ml: number("fluid_input").or_else(|| number("fluid_input_ml")),
        blood_loss_ml: number("blood_loss").or_else(|| number("blood_loss_ml")),
        urine_output_ml: number("urine_output").or_else(|| number("urine_output_ml")),
    }
}

/// Free text as typed, trimmed; scalars other than strings are rendered.
fn free_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
