use serde::Serialize;

use super::blood_gas::PlausibleRange;
use super::form_value::FormValue;

/// Intraoperative vital sign captured on the supplement form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    BloodPressureSystolic,
    BloodPressureDiastolic,
    HeartRate,
    Temperature,
    Spo2,
    RespiratoryRate,
}

impl VitalType {
    pub const ALL: [VitalType; 6] = [
        VitalType::BloodPressureSystolic,
        VitalType::BloodPressureDiastolic,
        VitalType::HeartRate,
        VitalType::Temperature,
        VitalType::Spo2,
        VitalType::RespiratoryRate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic => "blood_pressure_systolic",
            VitalType::BloodPressureDiastolic => "blood_pressure_diastolic",
            VitalType::HeartRate => "heart_rate",
            VitalType::Temperature => "temperature",
            VitalType::Spo2 => "spo2",
            VitalType::RespiratoryRate => "respiratory_rate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "blood_pressure_systolic" | "systolic" | "sbp" => {
                Some(VitalType::BloodPressureSystolic)
            }
            "blood_pressure_diastolic" | "diastolic" | "dbp" => {
                Some(VitalType::BloodPressureDiastolic)
            }
            "heart_rate" | "hr" | "pulse" => Some(VitalType::HeartRate),
            "temperature" | "temp" => Some(VitalType::Temperature),
            "spo2" | "oxygen_saturation" => Some(VitalType::Spo2),
            "respiratory_rate" | "rr" => Some(VitalType::RespiratoryRate),
            _ => None,
        }
    }

    /// Accepted numeric range; numbers outside it are rejected at assembly.
    pub fn accepted_range(self) -> PlausibleRange {
        match self {
            VitalType::BloodPressureSystolic => PlausibleRange::new(50.0, 250.0),
            VitalType::BloodPressureDiastolic => PlausibleRange::new(30.0, 150.0),
            VitalType::HeartRate => PlausibleRange::new(30.0, 200.0),
            VitalType::Temperature => PlausibleRange::new(35.0, 42.0),
            VitalType::Spo2 => PlausibleRange::new(70.0, 100.0),
            VitalType::RespiratoryRate => PlausibleRange::new(8.0, 40.0),
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            VitalType::BloodPressureSystolic | VitalType::BloodPressureDiastolic => "mmHg",
            VitalType::HeartRate => "bpm",
            VitalType::Temperature => "°C",
            VitalType::Spo2 => "%",
            VitalType::RespiratoryRate => "breaths/min",
        }
    }
}

/// Optional vital signs; absent values are omitted, never defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VitalSigns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<FormValue>,
}

impl VitalSigns {
    pub fn get(&self, kind: VitalType) -> Option<&FormValue> {
        match kind {
            VitalType::BloodPressureSystolic => self.blood_pressure_systolic.as_ref(),
            VitalType::BloodPressureDiastolic => self.blood_pressure_diastolic.as_ref(),
            VitalType::HeartRate => self.heart_rate.as_ref(),
            VitalType::Temperature => self.temperature.as_ref(),
            VitalType::Spo2 => self.spo2.as_ref(),
            VitalType::RespiratoryRate => self.respiratory_rate.as_ref(),
        }
    }

    pub fn set(&mut self, kind: VitalType, value: FormValue) {
        let slot = match kind {
            VitalType::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            VitalType::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            VitalType::HeartRate => &mut self.heart_rate,
            VitalType::Temperature => &mut self.temperature,
            VitalType::Spo2 => &mut self.spo2,
            VitalType::RespiratoryRate => &mut self.respiratory_rate,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        VitalType::ALL.iter().all(|k| self.get(*k).is_none())
    }
}
