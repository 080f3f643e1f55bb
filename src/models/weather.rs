//! The current-conditions snapshot produced by the gateway

use serde::{Deserialize, Serialize};

use super::ResolvedLocation;

/// Normalized weather condition: category, human description, icon code
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Condition {
    /// Main category ("Clear", "Clouds", "Rain", "Snow", "Thunderstorm", "Mist")
    pub main: String,
    /// Human-readable description ("heavy rain")
    pub description: String,
    /// Icon code ("09d")
    pub icon: String,
}

/// Wind reading with the provider-native km/h value preserved alongside the
/// converted m/s value so either can be displayed
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct Wind {
    /// Wind speed in m/s (converted from km/h)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_ms: Option<f64>,
    /// Wind speed in km/h as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_deg: Option<f64>,
    /// Cardinal direction ("N", "NE", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinal: Option<String>,
    /// Gust speed in m/s (converted from km/h)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust_ms: Option<f64>,
    /// Gust speed in km/h as reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust_kmh: Option<f64>,
}

/// One point-in-time reading for a place.
///
/// Fields the provider omitted stay absent; the normalizer never fabricates
/// a value, it only unit-converts values that are present.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherSnapshot {
    /// Resolved place this reading belongs to
    pub place: ResolvedLocation,
    /// Normalized weather condition
    pub condition: Condition,
    /// Temperature in Celsius (required; requests fail without it)
    pub temperature: f64,
    /// Apparent temperature in Celsius (falls back to `temperature`)
    pub feels_like: f64,
    /// Daily minimum, taken from the forecast's day-0 entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    /// Daily maximum, taken from the forecast's day-0 entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    /// Relative humidity percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Mean sea-level pressure in hPa
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    pub wind: Wind,
    /// Visibility in meters (converted from provider km)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_m: Option<f64>,
    /// Cloud cover percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    /// Precipitation probability percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_probability: Option<f64>,
    /// Precipitation amount over the last hour in mm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_amount_mm: Option<f64>,
    /// Dew point in Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<f64>,
    /// Heat index in Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_index: Option<f64>,
    /// Wind chill in Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_chill: Option<f64>,
    /// Thunderstorm probability percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thunderstorm_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_daytime: Option<bool>,
    /// Moon phase token from the day-0 forecast ("FULL_MOON", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<String>,
    /// Sunrise as epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    /// Sunset as epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
    /// When this snapshot was assembled, epoch seconds
    pub observed_at: i64,
}

impl Wind {
    /// Convert a degree heading to a 16-point cardinal name
    #[must_use]
    pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
        let deg = degrees.rem_euclid(360.0);
        match deg as u16 {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "N",
        }
    }
}
