//! Global settings loaded from TOML, following the same OnceLock pattern as
//! the romaji table.
//!
//! - `init_custom(toml_content)` sets a custom TOML; refused once `settings()` ran
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();
static INSTANCE: OnceLock<Settings> = OnceLock::new();

/// Set custom TOML. Fails once `settings()` has been called.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    if INSTANCE.get().is_some() {
        return Err(SettingsError::AlreadyInitialized);
    }
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already in use")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub candidates: CandidateSettings,
    pub cost: CostSettings,
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateSettings {
    pub max_results: usize,
    pub max_segment_units: usize,
    pub max_predictions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    pub unknown_unit_cost: i64,
    pub segment_penalty: i64,
    pub katakana_penalty: i64,
    pub prediction_penalty: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub context_window: usize,
    pub context_bonus: i64,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(candidates.max_results);
    check_positive_usize!(candidates.max_segment_units);

    check_non_negative!(cost.unknown_unit_cost);
    check_non_negative!(cost.segment_penalty);
    check_non_negative!(cost.katakana_penalty);
    check_non_negative!(cost.prediction_penalty);

    check_non_negative!(scoring.context_bonus);

    Ok(())
}
