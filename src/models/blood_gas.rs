use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Canonical blood-gas parameters, in report order.
///
/// Serialized keys are the wire keys used by the OCR payload and the
/// `blood_gas_json` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodGasField {
    Ph,
    Po2,
    Pco2,
    Na,
    K,
    Ca,
    Glu,
    Lac,
    Hct,
    #[serde(rename = "ca_74")]
    Ca74,
    Hco3Act,
    Hco3Std,
    Ctco2,
    BeEcf,
    BeB,
    So2c,
    Thbc,
    Temp,
}

/// Inclusive physiological plausibility bounds for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
}

impl PlausibleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

impl BloodGasField {
    pub const ALL: [BloodGasField; 18] = [
        Self::Ph,
        Self::Po2,
        Self::Pco2,
        Self::Na,
        Self::K,
        Self::Ca,
        Self::Glu,
        Self::Lac,
        Self::Hct,
        Self::Ca74,
        Self::Hco3Act,
        Self::Hco3Std,
        Self::Ctco2,
        Self::BeEcf,
        Self::BeB,
        Self::So2c,
        Self::Thbc,
        Self::Temp,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Po2 => "po2",
            Self::Pco2 => "pco2",
            Self::Na => "na",
            Self::K => "k",
            Self::Ca => "ca",
            Self::Glu => "glu",
            Self::Lac => "lac",
            Self::Hct => "hct",
            Self::Ca74 => "ca_74",
            Self::Hco3Act => "hco3_act",
            Self::Hco3Std => "hco3_std",
            Self::Ctco2 => "ctco2",
            Self::BeEcf => "be_ecf",
            Self::BeB => "be_b",
            Self::So2c => "so2c",
            Self::Thbc => "thbc",
            Self::Temp => "temp",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Alternative spellings seen in extractor output, matched case-insensitively.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Ph => &["ph"],
            Self::Po2 => &["po2", "pao2"],
            Self::Pco2 => &["pco2", "paco2"],
            Self::Na => &["na", "na+", "sodium"],
            Self::K => &["k", "k+", "potassium"],
            Self::Ca => &["ca", "ca++", "ca2+", "ica", "calcium"],
            Self::Glu => &["glu", "glucose"],
            Self::Lac => &["lac", "lactate"],
            Self::Hct => &["hct", "hematocrit"],
            Self::Ca74 => &["ca_74", "ca74", "ca++7.4", "ca(7.4)"],
            Self::Hco3Act => &["hco3_act", "hco3", "hco3-", "hco3act"],
            Self::Hco3Std => &["hco3_std", "hco3s", "shco3", "hco3std"],
            Self::Ctco2 => &["ctco2", "tco2"],
            Self::BeEcf => &["be_ecf", "beecf", "be", "base_excess"],
            Self::BeB => &["be_b", "be(b)", "beb"],
            Self::So2c => &["so2c", "sao2", "so2"],
            Self::Thbc => &["thbc", "thb", "cthb", "hb", "hgb"],
            Self::Temp => &["temp", "temperature"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Po2 => "PaO2",
            Self::Pco2 => "PaCO2",
            Self::Na => "Na+",
            Self::K => "K+",
            Self::Ca => "Ca++",
            Self::Glu => "GLU",
            Self::Lac => "LAC",
            Self::Hct => "HCT",
            Self::Ca74 => "Ca++(7.4)",
            Self::Hco3Act => "HCO3-",
            Self::Hco3Std => "HCO3std",
            Self::Ctco2 => "ctCO2",
            Self::BeEcf => "BEecf",
            Self::BeB => "BE(B)",
            Self::So2c => "SaO2",
            Self::Thbc => "THbc",
            Self::Temp => "Temp",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Ph => "",
            Self::Po2 | Self::Pco2 => "mmHg",
            Self::Hct | Self::So2c => "%",
            Self::Thbc => "g/L",
            Self::Temp => "°C",
            _ => "mmol/L",
        }
    }

    /// Values outside this range are treated as extraction errors.
    pub fn plausible_range(self) -> PlausibleRange {
        match self {
            Self::Ph => PlausibleRange::new(6.5, 8.0),
            Self::Po2 => PlausibleRange::new(0.0, 800.0),
            Self::Pco2 => PlausibleRange::new(0.0, 200.0),
            Self::Na => PlausibleRange::new(100.0, 180.0),
            Self::K => PlausibleRange::new(1.0, 10.0),
            Self::Ca | Self::Ca74 => PlausibleRange::new(0.2, 3.0),
            Self::Glu => PlausibleRange::new(0.0, 60.0),
            Self::Lac => PlausibleRange::new(0.0, 20.0),
            Self::Hct => PlausibleRange::new(0.0, 80.0),
            Self::Hco3Act | Self::Hco3Std => PlausibleRange::new(5.0, 40.0),
            Self::Ctco2 => PlausibleRange::new(0.0, 60.0),
            Self::BeEcf | Self::BeB => PlausibleRange::new(-30.0, 20.0),
            Self::So2c => PlausibleRange::new(0.0, 100.0),
            Self::Thbc => PlausibleRange::new(20.0, 250.0),
            Self::Temp => PlausibleRange::new(25.0, 45.0),
        }
    }

    /// Adult reference interval, used for display and prompt annotation.
    pub fn reference_range(self) -> PlausibleRange {
        match self {
            Self::Ph => PlausibleRange::new(7.35, 7.45),
            Self::Po2 => PlausibleRange::new(80.0, 100.0),
            Self::Pco2 => PlausibleRange::new(35.0, 45.0),
            Self::Na => PlausibleRange::new(135.0, 145.0),
            Self::K => PlausibleRange::new(3.5, 5.5),
            Self::Ca | Self::Ca74 => PlausibleRange::new(1.10, 1.35),
            Self::Glu => PlausibleRange::new(3.9, 6.1),
            Self::Lac => PlausibleRange::new(0.5, 2.2),
            Self::Hct => PlausibleRange::new(35.0, 50.0),
            Self::Hco3Act | Self::Hco3Std => PlausibleRange::new(22.0, 27.0),
            Self::Ctco2 => PlausibleRange::new(23.0, 28.0),
            Self::BeEcf | Self::BeB => PlausibleRange::new(-2.0, 2.0),
            Self::So2c => PlausibleRange::new(95.0, 100.0),
            Self::Thbc => PlausibleRange::new(120.0, 175.0),
            Self::Temp => PlausibleRange::new(36.0, 37.5),
        }
    }

    pub fn is_abnormal(self, value: f64) -> bool {
        !self.reference_range().contains(value)
    }
}

impl std::fmt::Display for BloodGasField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A value that parsed but fell outside its plausibility range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutOfRangeValue {
    pub field: BloodGasField,
    pub value: f64,
}

/// Rejected by [`BloodGasReading::set`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} value {value} outside plausible range {min}-{max}")]
pub struct ImplausibleValue {
    pub field: BloodGasField,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Normalized blood-gas panel.
///
/// Every stored value is finite and inside its field's plausibility range;
/// the only way in is [`BloodGasReading::set`]. Absent parameters are listed
/// in `missing_fields` rather than stored as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BloodGasReading {
    #[serde(flatten)]
    values: BTreeMap<BloodGasField, f64>,
    /// Extractor confidence, 0 when the extractor did not report one.
    pub confidence: f32,
    pub missing_fields: Vec<BloodGasField>,
    pub out_of_range: Vec<OutOfRangeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl BloodGasReading {
    pub fn get(&self, field: BloodGasField) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn set(&mut self, field: BloodGasField, value: f64) -> Result<(), ImplausibleValue> {
        let range = field.plausible_range();
        if !range.contains(value) {
            return Err(ImplausibleValue {
                field,
                value,
                min: range.min,
                max: range.max,
            });
        }
        self.values.insert(field, value);
        self.missing_fields.retain(|f| *f != field);
        Ok(())
    }

    /// Builder form of [`set`](Self::set) for fixtures; implausible values are dropped.
    pub fn with(mut self, field: BloodGasField, value: f64) -> Self {
        let _ = self.set(field, value);
        self
    }

    /// Present parameters in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (BloodGasField, f64)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }

    pub fn present_count(&self) -> usize {
        self.values.len()
    }

    /// True when no parameter at all survived normalization.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ph(&self) -> Option<f64> {
        self.get(BloodGasField::Ph)
    }

    pub fn pco2(&self) -> Option<f64> {
        self.get(BloodGasField::Pco2)
    }

    pub fn potassium(&self) -> Option<f64> {
        self.get(BloodGasField::K)
    }

    pub fn thbc(&self) -> Option<f64> {
        self.get(BloodGasField::Thbc)
    }

    /// Extracellular-fluid base excess, falling back to blood base excess.
    pub fn base_excess(&self) -> Option<f64> {
        self.get(BloodGasField::BeEcf)
            .or_else(|| self.get(BloodGasField::BeB))
    }

    /// Actual bicarbonate, falling back to standard bicarbonate.
    pub fn bicarbonate(&self) -> Option<f64> {
        self.get(BloodGasField::Hco3Act)
            .or_else(|| self.get(BloodGasField::Hco3Std))
    }

    /// Ionized calcium, falling back to the pH-7.4-corrected value.
    pub fn ionized_calcium(&self) -> Option<f64> {
        self.get(BloodGasField::Ca)
            .or_else(|| self.get(BloodGasField::Ca74))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_key() {
        for field in BloodGasField::ALL {
            assert_eq!(BloodGasField::from_key(field.key()), Some(field));
        }
        assert_eq!(BloodGasField::from_key("chloride"), None);
    }

    #[test]
    fn serde_key_matches_wire_key() {
        for field in BloodGasField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn set_rejects_out_of_range_without_clamping() {
        let mut reading = BloodGasReading::default();
        let err = reading.set(BloodGasField::Ph, 8.4).unwrap_err();
        assert_eq!(err.field, BloodGasField::Ph);
        assert_eq!(err.value, 8.4);
        assert_eq!(reading.ph(), None);
    }

    #[test]
    fn set_rejects_non_finite() {
        let mut reading = BloodGasReading::default();
        assert!(reading.set(BloodGasField::K, f64::NAN).is_err());
        assert!(reading.set(BloodGasField::K, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_is_a_storable_value() {
        let reading = BloodGasReading::default().with(BloodGasField::Lac, 0.0);
        assert_eq!(reading.get(BloodGasField::Lac), Some(0.0));
        assert!(!reading.is_empty());
    }

    #[test]
    fn set_clears_missing_marker() {
        let mut reading = BloodGasReading {
            missing_fields: vec![BloodGasField::K],
            ..Default::default()
        };
        reading.set(BloodGasField::K, 3.1).unwrap();
        assert!(reading.missing_fields.is_empty());
    }

    #[test]
    fn base_excess_prefers_ecf() {
        let reading = BloodGasReading::default()
            .with(BloodGasField::BeB, -6.0)
            .with(BloodGasField::BeEcf, -8.0);
        assert_eq!(reading.base_excess(), Some(-8.0));

        let only_b = BloodGasReading::default().with(BloodGasField::BeB, -6.0);
        assert_eq!(only_b.base_excess(), Some(-6.0));
    }

    #[test]
    fn serializes_present_values_flat() {
        let reading = BloodGasReading::default()
            .with(BloodGasField::Ph, 7.2)
            .with(BloodGasField::Ca74, 1.05);
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["ph"], 7.2);
        assert_eq!(json["ca_74"], 1.05);
        assert!(json.get("k").is_none());
        assert_eq!(json["confidence"], 0.0);
        assert!(json["missing_fields"].as_array().unwrap().is_empty());
    }

    #[test]
    fn abnormal_detection_uses_reference_interval() {
        assert!(BloodGasField::Ph.is_abnormal(7.20));
        assert!(!BloodGasField::Ph.is_abnormal(7.40));
        assert!(BloodGasField::K.is_abnormal(3.0));
    }
}
