//! Air quality models and category normalization

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Known AQI status categories.
///
/// Providers report categories as free text ("Moderate air quality"); the
/// gateway normalizes that text against this table and passes unrecognized
/// categories through verbatim instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiStatus {
    Excellent,
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiStatus {
    /// Match a lowercased, underscore-joined category token
    #[must_use]
    pub fn from_normalized(token: &str) -> Option<Self> {
        match token {
            "excellent" | "excellent_air_quality" => Some(Self::Excellent),
            "good" | "good_air_quality" => Some(Self::Good),
            "moderate" | "moderate_air_quality" => Some(Self::Moderate),
            "unhealthy_for_sensitive_groups" | "unhealthy_for_sensitive" => {
                Some(Self::UnhealthyForSensitive)
            }
            "unhealthy" | "unhealthy_air_quality" => Some(Self::Unhealthy),
            "very_unhealthy" | "very_unhealthy_air_quality" => Some(Self::VeryUnhealthy),
            "hazardous" | "hazardous_air_quality" => Some(Self::Hazardous),
            _ => None,
        }
    }

    /// Display status text
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// One-line health description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Air quality is excellent",
            Self::Good => "Air quality is good",
            Self::Moderate => "Air quality is moderate",
            Self::UnhealthyForSensitive => {
                "Members of sensitive groups may experience health effects"
            }
            Self::Unhealthy => "Everyone may begin to experience health effects",
            Self::VeryUnhealthy => "Health warnings of emergency conditions",
            Self::Hazardous => "Health alert: everyone may experience serious health effects",
        }
    }
}

/// One pollutant concentration reading
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pollutant {
    /// Pollutant code ("pm25", "no2", ...)
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Concentration value in the provider's units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Provider unit token ("MICROGRAMS_PER_CUBIC_METER", "PARTS_PER_BILLION")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Emission sources text, when the provider supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    /// Health-effects text, when the provider supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_effects: Option<String>,
}

impl Pollutant {
    /// Concentration expressed in µg/m³.
    ///
    /// PPB readings are converted with per-gas factors; µg/m³ readings pass
    /// through; unknown units pass through unconverted.
    #[must_use]
    pub fn as_micrograms(&self) -> Option<f64> {
        let value = self.value?;
        match self.unit.as_deref() {
            Some("PARTS_PER_BILLION") => {
                let factor = match self.code.as_str() {
                    "no2" => 1.88,
                    "o3" => 1.96,
                    "so2" => 2.62,
                    "co" => 1.145,
                    "nh3" => 0.696,
                    _ => 1.0,
                };
                Some(value * factor)
            }
            _ => Some(value),
        }
    }
}

/// One air-quality reading for a place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualitySample {
    /// AQI integer from the first (universal) index
    pub aqi: i64,
    /// Display form of the AQI value
    pub aqi_display: String,
    /// Normalized status label
    pub status: String,
    /// One-line description matching the status
    pub description: String,
    /// Index display name ("Universal AQI")
    pub display_name: String,
    /// Original category string from the provider, untouched
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_pollutant: Option<String>,
    pub coordinates: Coordinates,
    /// True only when no real reading exists; always false from the gateway
    pub estimated: bool,
    pub pollutants: Vec<Pollutant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_recommendation: Option<String>,
}
