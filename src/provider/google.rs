//! Google Maps Platform provider: Geocoding, Places, Weather, Air Quality

use std::time::Duration;

use serde_json::json;
use tracing::instrument;

use super::{
    AirQualityReport, CurrentReport, ForecastDayReport, GeocodeHit, PlaceHit, WeatherProvider,
};
use crate::error::WeatherError;
use crate::Result;

const MAPS_BASE: &str = "https://maps.googleapis.com";
const WEATHER_BASE: &str = "https://weather.googleapis.com";
const AIR_QUALITY_BASE: &str = "https://airquality.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How many forecast days to request; more than the display window needs so
/// the window always has material to draw from
const FORECAST_DAYS: u8 = 10;

/// Provider backed by the Google Maps Platform APIs.
///
/// Construction never fails; a missing API key surfaces as a per-request
/// configuration error so the server can start without one.
pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
    maps_base: String,
    weather_base: String,
    air_quality_base: String,
}

impl GoogleProvider {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("weatherdeck/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            maps_base: MAPS_BASE.to_string(),
            weather_base: WEATHER_BASE.to_string(),
            air_quality_base: AIR_QUALITY_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_bases(api_key: &str, base: &str) -> Self {
        let mut provider = Self::new(api_key);
        provider.maps_base = base.to_string();
        provider.weather_base = base.to_string();
        provider.air_quality_base = base.to_string();
        provider
    }

    fn key(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(WeatherError::config("GOOGLE_API_KEY is not set"));
        }
        Ok(&self.api_key)
    }

    async fn fetch_geocode(&self, params: &str) -> Result<Vec<GeocodeHit>> {
        let url = format!(
            "{}/maps/api/geocode/json?{}&key={}",
            self.maps_base,
            params,
            self.key()?
        );

        let response: wire::GeocodeResponse = self.client.get(&url).send().await?.json().await?;

        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().map(GeocodeHit::from).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(WeatherError::upstream(format!(
                "Geocoding failed with status {status}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl WeatherProvider for GoogleProvider {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>> {
        self.fetch_geocode(&format!("address={}", urlencoding::encode(address)))
            .await
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodeHit>> {
        self.fetch_geocode(&format!("latlng={lat},{lng}")).await
    }

    #[instrument(skip(self))]
    async fn current_conditions(&self, lat: f64, lng: f64) -> Result<CurrentReport> {
        let url = format!(
            "{}/v1/currentConditions:lookup?key={}&location.latitude={lat}&location.longitude={lng}",
            self.weather_base,
            self.key()?
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::upstream(format!(
                "Weather request failed with status {}",
                response.status()
            )));
        }

        let conditions: wire::CurrentConditions = response.json().await?;
        Ok(conditions.into())
    }

    #[instrument(skip(self))]
    async fn daily_forecast(&self, lat: f64, lng: f64) -> Result<Vec<ForecastDayReport>> {
        let url = format!(
            "{}/v1/forecast/days:lookup?key={}&location.latitude={lat}&location.longitude={lng}&days={FORECAST_DAYS}",
            self.weather_base,
            self.key()?
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::upstream(format!(
                "Forecast request failed with status {}",
                response.status()
            )));
        }

        let forecast: wire::ForecastResponse = response.json().await?;
        Ok(forecast
            .forecast_days
            .into_iter()
            .map(ForecastDayReport::from)
            .collect())
    }

    #[instrument(skip(self))]
    async fn air_quality(&self, lat: f64, lng: f64) -> Result<AirQualityReport> {
        let url = format!(
            "{}/v1/currentConditions:lookup?key={}",
            self.air_quality_base,
            self.key()?
        );

        let body = json!({
            "location": { "latitude": lat, "longitude": lng },
            "extraComputations": [
                "HEALTH_RECOMMENDATIONS",
                "DOMINANT_POLLUTANT_CONCENTRATION",
                "POLLUTANT_CONCENTRATION",
                "POLLUTANT_ADDITIONAL_INFO",
            ],
            "languageCode": "en",
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::upstream(format!(
                "Air quality request failed with status {}",
                response.status()
            )));
        }

        let air: wire::AirQualityResponse = response.json().await?;
        Ok(air.into())
    }

    #[instrument(skip(self))]
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceHit>> {
        let url = format!(
            "{}/maps/api/place/textsearch/json?query={}&key={}",
            self.maps_base,
            urlencoding::encode(query),
            self.key()?
        );

        let response: wire::PlaceSearchResponse =
            self.client.get(&url).send().await?.json().await?;

        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().map(PlaceHit::from).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(WeatherError::upstream(format!(
                "Place search failed with status {status}"
            ))),
        }
    }
}

/// Google API response structures and conversions into the provider-neutral
/// report types
mod wire {
    use serde::Deserialize;

    use crate::provider::{
        AirQualityReport, AqiIndexReport, CurrentReport, ForecastDayReport, GeocodeHit, PlaceHit,
        PollutantReport,
    };

    // ---- Geocoding / Places (snake_case JSON) ----

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResponse {
        pub status: String,
        #[serde(default)]
        pub results: Vec<GeocodeResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodeResult {
        pub geometry: Geometry,
        #[serde(default)]
        pub address_components: Vec<AddressComponent>,
        #[serde(default)]
        pub formatted_address: String,
        #[serde(default)]
        pub place_id: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct AddressComponent {
        pub long_name: String,
        pub short_name: String,
        pub types: Vec<String>,
    }

    impl From<GeocodeResult> for GeocodeHit {
        fn from(result: GeocodeResult) -> Self {
            let component = |wanted: &str| {
                result
                    .address_components
                    .iter()
                    .find(|c| c.types.iter().any(|t| t == wanted))
            };

            // Locality first, then the first-level administrative area
            let city = component("locality")
                .or_else(|| component("administrative_area_level_1"))
                .map(|c| c.long_name.clone());
            let country = component("country").map(|c| c.short_name.clone());

            GeocodeHit {
                lat: result.geometry.location.lat,
                lng: result.geometry.location.lng,
                city,
                country,
                formatted_address: result.formatted_address,
                place_id: result.place_id,
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceSearchResponse {
        pub status: String,
        #[serde(default)]
        pub results: Vec<PlaceResult>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceResult {
        pub name: String,
        #[serde(default)]
        pub formatted_address: String,
        pub geometry: Geometry,
        #[serde(default)]
        pub place_id: String,
    }

    impl From<PlaceResult> for PlaceHit {
        fn from(result: PlaceResult) -> Self {
            PlaceHit {
                name: result.name,
                formatted_address: result.formatted_address,
                lat: result.geometry.location.lat,
                lng: result.geometry.location.lng,
                place_id: result.place_id,
            }
        }
    }

    // ---- Weather API (camelCase JSON) ----

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CurrentConditions {
        pub temperature: Option<Degrees>,
        pub feels_like_temperature: Option<Degrees>,
        pub relative_humidity: Option<f64>,
        pub air_pressure: Option<AirPressure>,
        pub wind: Option<WindReading>,
        pub visibility: Option<Distance>,
        pub cloud_cover: Option<f64>,
        pub uv_index: Option<f64>,
        pub precipitation: Option<Precipitation>,
        pub dew_point: Option<Degrees>,
        pub heat_index: Option<Degrees>,
        pub wind_chill: Option<Degrees>,
        pub thunderstorm_probability: Option<f64>,
        pub is_daytime: Option<bool>,
        pub weather_condition: Option<WeatherCondition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Degrees {
        pub degrees: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AirPressure {
        pub mean_sea_level_millibars: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindReading {
        pub speed: Option<Measure>,
        pub direction: Option<WindDirection>,
        pub gust: Option<Measure>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Measure {
        pub value: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindDirection {
        pub degrees: Option<f64>,
        pub cardinal: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Distance {
        pub distance: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Precipitation {
        pub probability: Option<Probability>,
        pub qpf: Option<Quantity>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Probability {
        pub percent: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Quantity {
        pub quantity: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WeatherCondition {
        #[serde(rename = "type")]
        pub condition_type: Option<String>,
    }

    impl From<CurrentConditions> for CurrentReport {
        fn from(c: CurrentConditions) -> Self {
            let wind = c.wind.as_ref();
            CurrentReport {
                temperature: c.temperature.as_ref().and_then(|t| t.degrees),
                feels_like: c.feels_like_temperature.as_ref().and_then(|t| t.degrees),
                humidity: c.relative_humidity,
                pressure_mb: c
                    .air_pressure
                    .as_ref()
                    .and_then(|p| p.mean_sea_level_millibars),
                wind_speed_kmh: wind.and_then(|w| w.speed.as_ref()).and_then(|s| s.value),
                wind_direction_deg: wind
                    .and_then(|w| w.direction.as_ref())
                    .and_then(|d| d.degrees),
                wind_cardinal: wind
                    .and_then(|w| w.direction.as_ref())
                    .and_then(|d| d.cardinal.clone()),
                wind_gust_kmh: wind.and_then(|w| w.gust.as_ref()).and_then(|g| g.value),
                visibility_km: c.visibility.as_ref().and_then(|v| v.distance),
                cloud_cover: c.cloud_cover,
                uv_index: c.uv_index,
                precip_probability: c
                    .precipitation
                    .as_ref()
                    .and_then(|p| p.probability.as_ref())
                    .and_then(|p| p.percent),
                precip_amount_mm: c
                    .precipitation
                    .as_ref()
                    .and_then(|p| p.qpf.as_ref())
                    .and_then(|q| q.quantity),
                dew_point: c.dew_point.as_ref().and_then(|d| d.degrees),
                heat_index: c.heat_index.as_ref().and_then(|h| h.degrees),
                wind_chill: c.wind_chill.as_ref().and_then(|w| w.degrees),
                thunderstorm_probability: c.thunderstorm_probability,
                is_daytime: c.is_daytime,
                condition_token: c
                    .weather_condition
                    .and_then(|w| w.condition_type),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ForecastResponse {
        #[serde(default)]
        pub forecast_days: Vec<ForecastDayWire>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ForecastDayWire {
        pub min_temperature: Option<Degrees>,
        pub max_temperature: Option<Degrees>,
        pub daytime_forecast: Option<DayPart>,
        pub nighttime_forecast: Option<DayPart>,
        pub sun_events: Option<SunEvents>,
        pub moon_events: Option<MoonEvents>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DayPart {
        pub relative_humidity: Option<f64>,
        pub weather_condition: Option<WeatherCondition>,
        pub precipitation: Option<Precipitation>,
        pub wind: Option<WindReading>,
        pub uv_index: Option<f64>,
        pub air_pressure: Option<AirPressure>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SunEvents {
        pub sunrise_time: Option<String>,
        pub sunset_time: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoonEvents {
        pub moon_phase: Option<String>,
    }

    fn parse_epoch(timestamp: Option<&str>) -> Option<i64> {
        timestamp
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            .map(|dt| dt.timestamp())
    }

    impl From<ForecastDayWire> for ForecastDayReport {
        fn from(day: ForecastDayWire) -> Self {
            let daytime = day.daytime_forecast.as_ref();
            let nighttime = day.nighttime_forecast.as_ref();
            let day_wind = daytime.and_then(|d| d.wind.as_ref());

            ForecastDayReport {
                min_temp: day.min_temperature.as_ref().and_then(|t| t.degrees),
                max_temp: day.max_temperature.as_ref().and_then(|t| t.degrees),
                humidity_day: daytime.and_then(|d| d.relative_humidity),
                humidity_night: nighttime.and_then(|n| n.relative_humidity),
                pressure_mb: daytime
                    .and_then(|d| d.air_pressure.as_ref())
                    .and_then(|p| p.mean_sea_level_millibars),
                // Condition falls back to the nighttime part when the
                // daytime part carries none
                condition_token: daytime
                    .and_then(|d| d.weather_condition.as_ref())
                    .or_else(|| nighttime.and_then(|n| n.weather_condition.as_ref()))
                    .and_then(|w| w.condition_type.clone()),
                precip_probability_day: daytime
                    .and_then(|d| d.precipitation.as_ref())
                    .and_then(|p| p.probability.as_ref())
                    .and_then(|p| p.percent),
                precip_probability_night: nighttime
                    .and_then(|n| n.precipitation.as_ref())
                    .and_then(|p| p.probability.as_ref())
                    .and_then(|p| p.percent),
                wind_speed_kmh: day_wind.and_then(|w| w.speed.as_ref()).and_then(|s| s.value),
                wind_cardinal: day_wind
                    .and_then(|w| w.direction.as_ref())
                    .and_then(|d| d.cardinal.clone()),
                wind_gust_kmh: day_wind.and_then(|w| w.gust.as_ref()).and_then(|g| g.value),
                uv_index: daytime.and_then(|d| d.uv_index),
                precip_amount_mm: daytime
                    .and_then(|d| d.precipitation.as_ref())
                    .and_then(|p| p.qpf.as_ref())
                    .and_then(|q| q.quantity),
                sunrise: parse_epoch(
                    day.sun_events
                        .as_ref()
                        .and_then(|s| s.sunrise_time.as_deref()),
                ),
                sunset: parse_epoch(
                    day.sun_events
                        .as_ref()
                        .and_then(|s| s.sunset_time.as_deref()),
                ),
                moon_phase: day.moon_events.and_then(|m| m.moon_phase),
            }
        }
    }

    // ---- Air Quality API (camelCase JSON) ----

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AirQualityResponse {
        #[serde(default)]
        pub indexes: Vec<AqiIndexWire>,
        #[serde(default)]
        pub pollutants: Vec<PollutantWire>,
        pub health_recommendations: Option<HealthRecommendations>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AqiIndexWire {
        #[serde(default)]
        pub aqi: i64,
        pub aqi_display: Option<String>,
        #[serde(default)]
        pub category: String,
        pub display_name: Option<String>,
        pub dominant_pollutant: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PollutantWire {
        #[serde(default)]
        pub code: String,
        pub display_name: Option<String>,
        pub concentration: Option<Concentration>,
        pub additional_info: Option<AdditionalInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Concentration {
        pub value: Option<f64>,
        pub units: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AdditionalInfo {
        pub sources: Option<String>,
        pub effects: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HealthRecommendations {
        pub general_population: Option<String>,
    }

    impl From<AirQualityResponse> for AirQualityReport {
        fn from(response: AirQualityResponse) -> Self {
            AirQualityReport {
                indexes: response
                    .indexes
                    .into_iter()
                    .map(|index| AqiIndexReport {
                        aqi: index.aqi,
                        aqi_display: index.aqi_display,
                        category: index.category,
                        display_name: index.display_name,
                        dominant_pollutant: index.dominant_pollutant,
                    })
                    .collect(),
                pollutants: response
                    .pollutants
                    .into_iter()
                    .map(|pollutant| PollutantReport {
                        code: pollutant.code,
                        display_name: pollutant.display_name,
                        value: pollutant.concentration.as_ref().and_then(|c| c.value),
                        unit: pollutant.concentration.and_then(|c| c.units),
                        sources: pollutant
                            .additional_info
                            .as_ref()
                            .and_then(|i| i.sources.clone()),
                        health_effects: pollutant.additional_info.and_then(|i| i.effects),
                    })
                    .collect(),
                general_recommendation: response
                    .health_recommendations
                    .and_then(|h| h.general_population),
            }
        }
    }
}
