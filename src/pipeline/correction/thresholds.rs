use crate::config::AppConfig;

/// Clinical constants used by the correction engine.
///
/// The defaults are the documented institutional values. They require
/// clinical validation before deployment and can be overridden per site.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionConfig {
    /// Acidemia when pH is below this.
    pub acidosis_ph: f64,
    /// Base deficit when BE (mmol/L) is below this.
    pub acidosis_be: f64,
    /// pH below which severe acidemia is alerted.
    pub severe_acidemia_ph: f64,
    /// Bicarbonate space, L/kg.
    pub bicarbonate_distribution_factor: f64,
    /// 5% sodium bicarbonate, mmol per mL.
    pub nahco3_5pct_mmol_per_ml: f64,

    pub alkalosis_ph: f64,
    /// Metabolic component when HCO3- (mmol/L) is above this.
    pub metabolic_hco3: f64,
    /// Respiratory component when PaCO2 (mmHg) is below this.
    pub respiratory_pco2: f64,

    /// Transfusion target THbc, g/L.
    pub target_thbc: f64,
    /// Hb rise per PRBC unit at the reference weight, g/L.
    pub prbc_rise_per_unit: f64,
    pub prbc_reference_weight_kg: f64,

    pub potassium_low: f64,
    pub potassium_high: f64,
    pub potassium_target: f64,
    pub potassium_distribution_factor: f64,
    pub kcl_mmol_per_gram: f64,
    pub potassium_critical_low: f64,
    pub potassium_critical_high: f64,

    pub calcium_low: f64,
    pub calcium_high: f64,
    pub calcium_critical_low: f64,
    pub calcium_critical_high: f64,
    pub calcium_gluconate_mmol_per_gram: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            acidosis_ph: 7.35,
            acidosis_be: -2.0,
            severe_acidemia_ph: 7.20,
            bicarbonate_distribution_factor: 0.3,
            nahco3_5pct_mmol_per_ml: 0.595,

            alkalosis_ph: 7.45,
            metabolic_hco3: 26.0,
            respiratory_pco2: 35.0,

            target_thbc: 100.0,
            prbc_rise_per_unit: 7.0,
            prbc_reference_weight_kg: 70.0,

            potassium_low: 3.5,
            potassium_high: 5.5,
            potassium_target: 4.0,
            potassium_distribution_factor: 0.3,
            kcl_mmol_per_gram: 13.4,
            potassium_critical_low: 2.5,
            potassium_critical_high: 6.5,

            calcium_low: 1.10,
            calcium_high: 1.35,
            calcium_critical_low: 0.80,
            calcium_critical_high: 1.60,
            calcium_gluconate_mmol_per_gram: 2.2,
        }
    }
}

impl CorrectionConfig {
    /// Defaults with the site transfusion target from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            target_thbc: config.target_thbc,
            ..Self::default()
        }
    }
}
