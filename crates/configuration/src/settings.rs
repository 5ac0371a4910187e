use crate::error::ConfigError;
use core_types::{CampaignInputs, CoreError, InputField};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The default threshold below which a delta indicator is hidden, in percent.
pub const DEFAULT_DELTA_THRESHOLD_PCT: f64 = 0.1;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: InputDefaults,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

/// Overrides for the starting input tuple.
///
/// Keys may be written in snake_case, kebab-case or the camelCase used by JSON
/// output. They are resolved to one field each before anything is stored, so
/// two spellings of the same key never collide.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct InputDefaults {
    pub campaign_duration: Option<f64>,
    pub total_ad_spend: Option<f64>,
    pub cpm: Option<f64>,
    pub ad_ctr: Option<f64>,
    pub vsl_to_of_ctr: Option<f64>,
    pub order_form_conversion: Option<f64>,
    pub aov: Option<f64>,
}

impl InputDefaults {
    pub fn get(&self, field: InputField) -> Option<f64> {
        match field {
            InputField::CampaignDuration => self.campaign_duration,
            InputField::TotalAdSpend => self.total_ad_spend,
            InputField::Cpm => self.cpm,
            InputField::AdCtr => self.ad_ctr,
            InputField::VslToOfCtr => self.vsl_to_of_ctr,
            InputField::OrderFormConversion => self.order_form_conversion,
            InputField::Aov => self.aov,
        }
    }

    pub fn set(&mut self, field: InputField, value: f64) {
        let slot = match field {
            InputField::CampaignDuration => &mut self.campaign_duration,
            InputField::TotalAdSpend => &mut self.total_ad_spend,
            InputField::Cpm => &mut self.cpm,
            InputField::AdCtr => &mut self.ad_ctr,
            InputField::VslToOfCtr => &mut self.vsl_to_of_ctr,
            InputField::OrderFormConversion => &mut self.order_form_conversion,
            InputField::Aov => &mut self.aov,
        };
        *slot = Some(value);
    }

    /// Copies every value `other` sets over this one.
    pub fn overlay(&mut self, other: &InputDefaults) {
        for field in InputField::ALL {
            if let Some(value) = other.get(field) {
                self.set(field, value);
            }
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for InputDefaults {
    type Error = CoreError;

    fn try_from(entries: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut defaults = InputDefaults::default();
        for (key, value) in entries {
            defaults.set(key.parse()?, value);
        }
        Ok(defaults)
    }
}

/// Presentation knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Deltas whose absolute value is below this percentage are not shown.
    pub delta_threshold_pct: f64,
    /// When true, typed values in a session are clamped like slider moves.
    pub clamp_text_entry: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            delta_threshold_pct: DEFAULT_DELTA_THRESHOLD_PCT,
            clamp_text_entry: false,
        }
    }
}

/// Output style of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `warn` or `analytics=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// Log to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl Config {
    /// Rejects values no forecast can sensibly start from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.display.delta_threshold_pct;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "display.delta_threshold_pct must be a non-negative number, got {threshold}"
            )));
        }

        for field in InputField::ALL {
            if let Some(value) = self.defaults.get(field) {
                if !value.is_finite() {
                    return Err(ConfigError::ValidationError(format!(
                        "defaults.{} must be finite, got {value}",
                        field.key()
                    )));
                }
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The seed tuple with any configured overrides applied.
    ///
    /// Overrides outside a field's slider range are kept but logged.
    pub fn default_inputs(&self) -> CampaignInputs {
        let mut inputs = CampaignInputs::default();
        for field in InputField::ALL {
            if let Some(value) = self.defaults.get(field) {
                if !field.range().contains(value) {
                    tracing::warn!(%field, value, "Configured default is outside the slider range.");
                }
                inputs.set(field, value);
            }
        }
        inputs
    }
}
