//! Upstream provider abstraction
//!
//! One method per data kind, returning provider-neutral reports. The gateway's
//! normalization layer depends only on this trait, so an alternate provider
//! can be substituted without touching the normalization contracts.

use async_trait::async_trait;

use crate::Result;

pub mod google;

pub use google::GoogleProvider;

/// One geocoding hit, forward or reverse
#[derive(Debug, Clone)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lng: f64,
    /// Locality name, falling back to the first administrative area
    pub city: Option<String>,
    /// Country code, short form
    pub country: Option<String>,
    pub formatted_address: String,
    pub place_id: String,
}

/// One place-search hit for autocomplete
#[derive(Debug, Clone)]
pub struct PlaceHit {
    pub name: String,
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
}

/// Current-conditions report in provider-native units (temperatures °C,
/// wind km/h, visibility km, pressure hPa). Every field the provider can omit
/// is optional; the gateway decides which absences are fatal.
#[derive(Debug, Clone, Default)]
pub struct CurrentReport {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub wind_cardinal: Option<String>,
    pub wind_gust_kmh: Option<f64>,
    pub visibility_km: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub uv_index: Option<f64>,
    pub precip_probability: Option<f64>,
    pub precip_amount_mm: Option<f64>,
    pub dew_point: Option<f64>,
    pub heat_index: Option<f64>,
    pub wind_chill: Option<f64>,
    pub thunderstorm_probability: Option<f64>,
    pub is_daytime: Option<bool>,
    pub condition_token: Option<String>,
}

/// One day of the provider's multi-day forecast, provider-native units
#[derive(Debug, Clone, Default)]
pub struct ForecastDayReport {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub humidity_day: Option<f64>,
    pub humidity_night: Option<f64>,
    /// Day-level pressure; most providers omit this
    pub pressure_mb: Option<f64>,
    pub condition_token: Option<String>,
    pub precip_probability_day: Option<f64>,
    pub precip_probability_night: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_cardinal: Option<String>,
    pub wind_gust_kmh: Option<f64>,
    pub uv_index: Option<f64>,
    pub precip_amount_mm: Option<f64>,
    /// Sunrise as epoch seconds
    pub sunrise: Option<i64>,
    /// Sunset as epoch seconds
    pub sunset: Option<i64>,
    pub moon_phase: Option<String>,
}

/// One AQI index entry
#[derive(Debug, Clone)]
pub struct AqiIndexReport {
    pub aqi: i64,
    pub aqi_display: Option<String>,
    pub category: String,
    pub display_name: Option<String>,
    pub dominant_pollutant: Option<String>,
}

/// One pollutant concentration entry
#[derive(Debug, Clone)]
pub struct PollutantReport {
    pub code: String,
    pub display_name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub sources: Option<String>,
    pub health_effects: Option<String>,
}

/// Full air-quality report: index list may be empty, which the gateway
/// treats as "no data"
#[derive(Debug, Clone, Default)]
pub struct AirQualityReport {
    pub indexes: Vec<AqiIndexReport>,
    pub pollutants: Vec<PollutantReport>,
    pub general_recommendation: Option<String>,
}

/// Upstream data provider: geocoding, weather, air quality, place search
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Forward-geocode a free-text address
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>>;

    /// Reverse-geocode a coordinate pair
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeHit>>;

    /// Current conditions at a coordinate pair
    async fn current_conditions(&self, lat: f64, lng: f64) -> Result<CurrentReport>;

    /// Multi-day forecast at a coordinate pair; may return more or fewer
    /// days than the display window needs
    async fn daily_forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastDayReport>>;

    /// Current air quality at a coordinate pair
    async fn air_quality(&self, lat: f64, lng: f64) -> Result<AirQualityReport>;

    /// Free-text place search for autocomplete
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceHit>>;
}
