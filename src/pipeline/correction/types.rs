use serde::Serialize;

// ═══════════════════════════════════════════════════════════════════════
// Acid correction
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcidCorrection {
    Indicated(BicarbonateDose),
    NotApplicable {
        reason: String,
    },
    InsufficientData {
        condition: String,
        missing: Vec<&'static str>,
        reason: String,
    },
}

/// Sodium bicarbonate estimate for metabolic acidosis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BicarbonateDose {
    pub condition: String,
    pub formula: String,
    pub base_excess: f64,
    pub weight_kg: f64,
    pub distribution_factor: f64,
    pub sodium_bicarbonate_mmol: f64,
    pub sodium_bicarbonate_5pct_ml: f64,
    pub initial_half_dose_mmol: f64,
    pub initial_half_dose_ml: f64,
    pub basis: String,
    pub recommendation: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Alkalosis management
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlkalosisSubtype {
    Metabolic,
    Respiratory,
    Mixed,
    Undetermined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlkalosisManagement {
    Indicated(AlkalosisGuidance),
    NotApplicable {
        reason: String,
    },
    InsufficientData {
        missing: Vec<&'static str>,
        reason: String,
    },
}

/// Qualitative alkalosis guidance; no doses are computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlkalosisGuidance {
    pub condition: String,
    pub subtype: AlkalosisSubtype,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k_level: Option<f64>,
    pub fluid_therapy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ventilation_adjustment: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Transfusion guidance
// ═══════════════════════════════════════════════════════════════════════

/// Present only when THbc was measured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransfusionGuidance {
    pub condition: String,
    pub current_thbc: f64,
    pub target_thbc: f64,
    pub hemoglobin_deficit: f64,
    pub prbc: PrbcEstimate,
    pub clinical_reminders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrbcEstimate {
    NotRequired,
    Estimated {
        units: u32,
        hb_rise_per_unit: f64,
        formula: String,
        weight_kg: f64,
    },
    InsufficientData {
        reason: String,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Electrolyte correction
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectrolyteSeverity {
    Mild,
    Critical,
}

/// Emitted only for a value outside its normal band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectrolyteFinding {
    pub current: f64,
    pub normal_range: String,
    pub direction: Direction,
    pub severity: ElectrolyteSeverity,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_deficit_mmol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kcl_grams: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElectrolyteCorrection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium: Option<ElectrolyteFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calcium: Option<ElectrolyteFinding>,
}

impl ElectrolyteCorrection {
    pub fn is_empty(&self) -> bool {
        self.potassium.is_none() && self.calcium.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Combined
// ═══════════════════════════════════════════════════════════════════════

/// Output of the correction engine for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Corrections {
    pub acid_correction: AcidCorrection,
    pub alkalosis_management: AlkalosisManagement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfusion_guidance: Option<TransfusionGuidance>,
    pub electrolyte_correction: ElectrolyteCorrection,
}
