//! Forecast window models: the 5-day anchored display window

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Condition summary carried per forecast day (no description; the day cards
/// only show category and icon)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastCondition {
    pub main: String,
    pub icon: String,
}

/// One aggregated day within the 5-day display window.
///
/// The window is anchored so the current day sits at index 2: two days back,
/// today, two days forward.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    /// Display label: "Today", "Tomorrow", "Yesterday", or a weekday name
    pub day: String,
    /// Weekday short name ("Mon")
    pub day_name: String,
    /// Human month/day label ("Jul 4")
    pub date: String,
    /// ISO calendar date ("2026-07-04")
    pub full_date: String,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Always `(temp_min + temp_max) / 2`
    pub temp_avg: f64,
    /// Daytime relative humidity, falling back to nighttime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Pressure in hPa; day value, then the current snapshot's pressure,
    /// then the standard atmosphere
    pub pressure: f64,
    pub weather: ForecastCondition,
    /// True only for the anchor day (index 2)
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_probability: Option<f64>,
    /// Wind speed in m/s (converted from km/h)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed_ms: Option<f64>,
    /// Wind speed in km/h as reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed_kmh: Option<f64>,
    /// Cardinal wind direction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    /// Wind gust in km/h
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    /// Precipitation amount in mm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precip_amount_mm: Option<f64>,
}

/// The chart endpoint's payload: resolved city plus the 5-day window
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChartSeries {
    pub city: String,
    pub coordinates: Coordinates,
    pub combined: Vec<ForecastDay>,
}
