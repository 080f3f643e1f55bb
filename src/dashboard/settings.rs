//! Dashboard settings with merge-over-defaults loading

use serde::{Deserialize, Serialize};

/// Default auto-refresh interval: ten minutes
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius value into this unit
    #[must_use]
    pub fn from_celsius(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Display a Celsius value in this unit, rounded to a whole degree
    #[must_use]
    pub fn format(&self, celsius: f64) -> String {
        format!("{}{}", self.from_celsius(celsius).round(), self.symbol())
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// User-facing dashboard settings.
///
/// Every field has a default and the struct deserializes with
/// `serde(default)`, so a stored record from an older release that lacks
/// newer fields loads cleanly with the missing fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub temperature_unit: TemperatureUnit,
    pub auto_refresh: bool,
    pub refresh_interval_ms: u64,
    pub weather_backgrounds: bool,
    pub notifications: bool,
    pub keyboard_shortcuts: bool,
    pub autocomplete: bool,
    pub data_source: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Celsius,
            auto_refresh: true,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            weather_backgrounds: true,
            notifications: false,
            keyboard_shortcuts: true,
            autocomplete: true,
            data_source: "auto".to_string(),
        }
    }
}
