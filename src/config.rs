use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "AnesGuardian";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "blood-gas-analyzer";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;
/// 10 MiB, the largest report photo accepted by `/api/v1/ocr`.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Transfusion target THbc (g/L) used when the clinician does not override it.
pub const DEFAULT_TARGET_THBC: f64 = 100.0;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "anesguardian=debug,tower_http=info,info"
    } else {
        "anesguardian=info,warn"
    }
}

/// Runtime configuration, read once at startup.
///
/// Every value has a documented default; a malformed environment value is
/// logged and replaced by its default rather than aborting startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ocr_timeout_secs: u64,
    pub analysis_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub target_thbc: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8000))),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            ocr_timeout_secs: DEFAULT_OCR_TIMEOUT_SECS,
            analysis_timeout_secs: DEFAULT_ANALYSIS_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            target_thbc: DEFAULT_TARGET_THBC,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            bind_addr: parse_or(get("ANESGUARD_BIND"), "ANESGUARD_BIND", defaults.bind_addr),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: get("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            ocr_timeout_secs: parse_or(
                get("ANESGUARD_OCR_TIMEOUT_SECS"),
                "ANESGUARD_OCR_TIMEOUT_SECS",
                defaults.ocr_timeout_secs,
            ),
            analysis_timeout_secs: parse_or(
                get("ANESGUARD_ANALYSIS_TIMEOUT_SECS"),
                "ANESGUARD_ANALYSIS_TIMEOUT_SECS",
                defaults.analysis_timeout_secs,
            ),
            max_upload_bytes: parse_or(
                get("ANESGUARD_MAX_UPLOAD_BYTES"),
                "ANESGUARD_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            ),
            target_thbc: parse_target_thbc(get("ANESGUARD_TARGET_THBC"), defaults.target_thbc),
        }
    }

    pub fn has_provider_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, "Invalid configuration value, using default");
            default
        }),
    }
}

fn parse_target_thbc(raw: Option<String>, default: f64) -> f64 {
    let value: f64 = parse_or(raw, "ANESGUARD_TARGET_THBC", default);
    if value.is_finite() && (60.0..=150.0).contains(&value) {
        value
    } else {
        tracing::warn!(value, "ANESGUARD_TARGET_THBC outside 60-150 g/L, using default");
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_anesguardian() {
        assert_eq!(APP_NAME, "AnesGuardian");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.target_thbc, 100.0);
        assert!(!config.has_provider_key());
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANESGUARD_BIND", "127.0.0.1:9100"),
            ("GEMINI_API_KEY", "  secret  "),
            ("GEMINI_MODEL", "gemini-3-flash-preview"),
            ("GEMINI_BASE_URL", "http://localhost:9999/v1beta/"),
            ("ANESGUARD_TARGET_THBC", "80"),
        ]));
        assert_eq!(config.bind_addr.port(), 9100);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-3-flash-preview");
        assert_eq!(config.gemini_base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.target_thbc, 80.0);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANESGUARD_BIND", "not-an-address"),
            ("ANESGUARD_OCR_TIMEOUT_SECS", "sixty"),
            ("ANESGUARD_TARGET_THBC", "400"),
        ]));
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.ocr_timeout_secs, DEFAULT_OCR_TIMEOUT_SECS);
        assert_eq!(config.target_thbc, DEFAULT_TARGET_THBC);
    }

    #[test]
    fn blank_api_key_is_treated_as_absent() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")]));
        assert!(config.gemini_api_key.is_none());
    }
}
