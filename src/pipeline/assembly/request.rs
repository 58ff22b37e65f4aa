use super::form::{parse_anesthesia, parse_vital_signs, RawAnalysisForm};
use super::ValidationError;
use crate::models::{
    parse_decimal, AnalysisRequest, BloodGasReading, PatientContext, PlausibleRange,
    TARGET_THBC_RANGE, WEIGHT_RANGE,
};
use crate::pipeline::correction::CorrectionConfig;

/// Build the immutable analysis request from the reviewed reading and the
/// supplement form.
///
/// Optional groups with no populated field are dropped. Weight and target
/// THbc are numeric-only; the target falls back to the configured default.
/// A blood-gas value that parsed but is implausible rejects the request.
pub fn assemble(
    reading: BloodGasReading,
    form: &RawAnalysisForm,
    config: &CorrectionConfig,
) -> Result<AnalysisRequest, ValidationError> {
    if let Some(rejected) = reading.out_of_range.first() {
        let range = rejected.field.plausible_range();
        return Err(ValidationError::OutOfRange {
            field: rejected.field.key(),
            value: rejected.value,
            min: range.min,
            max: range.max,
        });
    }
    if reading.is_empty() {
        return Err(ValidationError::EmptyReport);
    }

    let vital_signs = form
        .vital_signs
        .as_ref()
        .map(parse_vital_signs)
        .transpose()?;
    let anesthesia = form.anesthesia.as_ref().map(parse_anesthesia);

    let weight_kg = parse_weight(form.weight.as_deref())?;
    let target_thbc = parse_bounded(form.target_thbc.as_deref(), "target_thbc", TARGET_THBC_RANGE)?
        .unwrap_or(config.target_thbc);

    let request = AnalysisRequest::from_parts(
        reading,
        vital_signs,
        anesthesia,
        PatientContext::new(weight_kg, target_thbc),
    );

    tracing::debug!(
        blood_gas_fields = request.blood_gas().present_count(),
        has_vitals = request.vital_signs().is_some(),
        has_anesthesia = request.anesthesia().is_some(),
        has_weight = weight_kg.is_some(),
        "Analysis request assembled"
    );

    Ok(request)
}

/// Patient weight as typed on a form. Blank is absent.
pub fn parse_weight(raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    parse_bounded(raw, "weight", WEIGHT_RANGE)
}

/// Blank is absent; anything else must be a number inside `range`.
fn parse_bounded(
    raw: Option<&str>,
    field: &'static str,
    range: PlausibleRange,
) -> Result<Option<f64>, ValidationError> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let value = parse_decimal(text).ok_or(ValidationError::NotNumeric { field })?;
    if !range.contains(value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: range.min,
            max: range.max,
        });
    }
    Ok(Some(value))
}
