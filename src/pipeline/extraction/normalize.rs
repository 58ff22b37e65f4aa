use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::ExtractionError;
use crate::models::{json_number, BloodGasField, BloodGasReading, OutOfRangeValue};
use crate::pipeline::structuring::isolate_json_object;

/// Parse the OCR model's reply text into a JSON object.
///
/// Markdown fences and surrounding prose are tolerated; anything that is not
/// a JSON object is an error.
pub fn parse_ocr_reply(text: &str) -> Result<Value, ExtractionError> {
    let candidate = isolate_json_object(text);
    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractionError::MalformedReply(e.to_string()))?;
    if !value.is_object() {
        return Err(ExtractionError::MalformedReply(
            "top-level value is not an object".into(),
        ));
    }
    Ok(value)
}

/// Normalize an OCR payload of unknown shape into a blood-gas reading.
///
/// Each canonical field is looked up under its aliases (case-insensitive).
/// A value is kept only when it parses to a finite number inside the field's
/// plausibility range; everything else is recorded as missing, and parsed but
/// implausible values are also listed in `out_of_range`. Zero is a value.
///
/// An `out_of_range` list already on the payload (a resubmitted reading) is
/// carried over for fields that still have no valid value.
pub fn normalize_extraction(raw: &Value) -> BloodGasReading {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let lowered: Vec<(String, &Value)> = obj
        .iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .collect();

    let mut reading = BloodGasReading::default();
    let mut unparseable = 0usize;

    for field in BloodGasField::ALL {
        let Some(candidate) = lookup(&lowered, field) else {
            reading.missing_fields.push(field);
            continue;
        };
        match json_number(candidate) {
            Some(value) => {
                if let Err(rejected) = reading.set(field, value) {
                    reading.out_of_range.push(OutOfRangeValue {
                        field: rejected.field,
                        value: rejected.value,
                    });
                    reading.missing_fields.push(field);
                }
            }
            None => {
                unparseable += 1;
                reading.missing_fields.push(field);
            }
        }
    }

    for carried in reported_out_of_range(obj.get("out_of_range")) {
        let already_flagged = reading.out_of_range.iter().any(|o| o.field == carried.field);
        if reading.get(carried.field).is_none() && !already_flagged {
            reading.out_of_range.push(carried);
        }
    }

    let reported_missing = reported_missing_fields(obj.get("missing_fields"));
    let contradicted = reported_missing
        .iter()
        .filter(|f| reading.get(**f).is_some())
        .count();

    reading.confidence = obj
        .get("confidence")
        .and_then(json_number)
        .map(|c| c.clamp(0.0, 1.0) as f32)
        .unwrap_or(0.0);
    reading.extracted_at = obj.get("extracted_at").and_then(parse_timestamp);

    tracing::debug!(
        present = reading.present_count(),
        missing = reading.missing_fields.len(),
        out_of_range = reading.out_of_range.len(),
        unparseable,
        reported_missing = reported_missing.len(),
        contradicted,
        confidence = reading.confidence,
        "OCR payload normalized"
    );

    reading
}

/// First non-null value under any of the field's aliases.
fn lookup<'a>(lowered: &[(String, &'a Value)], field: BloodGasField) -> Option<&'a Value> {
    field.aliases().iter().find_map(|alias| {
        lowered
            .iter()
            .find(|(key, value)| key == alias && !value.is_null())
            .map(|(_, value)| *value)
    })
}

/// Canonical fields the extractor itself reported as unreadable.
fn reported_missing_fields(raw: Option<&Value>) -> Vec<BloodGasField> {
    let Some(Value::Array(items)) = raw else {
        return vec![];
    };
    let mut fields: Vec<BloodGasField> = items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|name| {
            let lower = name.trim().to_lowercase();
            BloodGasField::ALL
                .iter()
                .copied()
                .find(|f| f.aliases().contains(&lower.as_str()))
        })
        .collect();
    fields.sort();
    fields.dedup();
    fields
}

/// `{field, value}` entries whose value really is implausible for the field.
fn reported_out_of_range(raw: Option<&Value>) -> Vec<OutOfRangeValue> {
    let Some(Value::Array(items)) = raw else {
        return vec![];
    };
    items
        .iter()
        .filter_map(|item| {
            let name = item.get("field")?.as_str()?.trim().to_lowercase();
            let field = BloodGasField::ALL
                .iter()
                .copied()
                .find(|f| f.aliases().contains(&name.as_str()))?;
            let value = item.get("value").and_then(json_number)?;
            (!field.plausible_range().contains(value)).then_some(OutOfRangeValue { field, value })
        })
        .collect()
}

/// RFC 3339, or a bare ISO-8601 datetime taken as UTC.
fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    let s = raw.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
