//! Gateway normalization layer
//!
//! Sits between the HTTP surface and the upstream provider. Resolves location
//! queries, assembles current-conditions snapshots, builds the anchored 5-day
//! chart window, and normalizes air-quality readings. All unit conversions
//! and fallback chains live here so the API handlers stay thin.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, instrument, warn};

use crate::conditions::map_condition;
use crate::error::WeatherError;
use crate::models::{
    AirQualitySample, AqiStatus, ChartSeries, CitySuggestion, Coordinates, ForecastCondition,
    ForecastDay, Pollutant, ResolvedLocation, WeatherSnapshot, Wind,
};
use crate::provider::{CurrentReport, ForecastDayReport, WeatherProvider};
use crate::Result;

/// Standard atmosphere, the last resort of the pressure fallback chain
pub const STANDARD_PRESSURE_MB: f64 = 1013.25;

/// Days in the display window; the current day sits at [`ANCHOR_INDEX`]
pub const WINDOW_DAYS: usize = 5;
pub const ANCHOR_INDEX: usize = 2;

/// Maximum number of city suggestions returned by a search
const MAX_CITY_RESULTS: usize = 5;

/// A parsed location query: either a free-text city name or an explicit
/// coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lng: f64 },
}

impl LocationQuery {
    /// Parse user input into a query.
    ///
    /// A `"lat,lng"` pair with both halves numeric and in range is treated as
    /// coordinates; anything else non-empty is a city name.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::location_not_found(input));
        }

        if let Some((lat_part, lng_part)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (
                lat_part.trim().parse::<f64>(),
                lng_part.trim().parse::<f64>(),
            ) {
                return Self::coordinates(lat, lng);
            }
        }

        Ok(Self::City(trimmed.to_string()))
    }

    /// Build a coordinate query, rejecting out-of-range values
    pub fn coordinates(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(WeatherError::location_not_found(format!("{lat},{lng}")));
        }
        Ok(Self::Coordinates { lat, lng })
    }
}

/// The normalization gateway over an upstream [`WeatherProvider`]
pub struct Gateway {
    provider: Arc<dyn WeatherProvider>,
}

impl Gateway {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a query to a complete location.
    ///
    /// City names that geocode to nothing fail with `LocationNotFound`.
    /// Coordinates always resolve; when reverse geocoding carries no usable
    /// names, the city and country degrade to `"Unknown"`.
    #[instrument(skip(self))]
    pub async fn resolve_location(&self, query: &LocationQuery) -> Result<ResolvedLocation> {
        match query {
            LocationQuery::City(name) => {
                let hits = self.provider.geocode(name).await?;
                let Some(hit) = hits.into_iter().next() else {
                    return Err(WeatherError::location_not_found(name));
                };
                debug!(city = ?hit.city, "Geocoded city query");
                Ok(ResolvedLocation {
                    lat: hit.lat,
                    lng: hit.lng,
                    city: hit.city.unwrap_or_else(|| "Unknown".to_string()),
                    country: hit.country.unwrap_or_else(|| "Unknown".to_string()),
                })
            }
            LocationQuery::Coordinates { lat, lng } => {
                let hit = self
                    .provider
                    .reverse_geocode(*lat, *lng)
                    .await
                    .unwrap_or_else(|err| {
                        warn!(%err, "Reverse geocoding failed, keeping raw coordinates");
                        Vec::new()
                    })
                    .into_iter()
                    .next();

                let (city, country) = match hit {
                    Some(hit) => (
                        hit.city.unwrap_or_else(|| "Unknown".to_string()),
                        hit.country.unwrap_or_else(|| "Unknown".to_string()),
                    ),
                    None => ("Unknown".to_string(), "Unknown".to_string()),
                };

                Ok(ResolvedLocation {
                    lat: *lat,
                    lng: *lng,
                    city,
                    country,
                })
            }
        }
    }

    /// Assemble the current-conditions snapshot for a query.
    ///
    /// The current temperature is the one hard requirement; a payload without
    /// it fails the whole request. Daily min/max and sun/moon data come from
    /// the forecast's first day and are tolerated missing.
    #[instrument(skip(self))]
    pub async fn current_snapshot(&self, query: &LocationQuery) -> Result<WeatherSnapshot> {
        let place = self.resolve_location(query).await?;

        let current = self.provider.current_conditions(place.lat, place.lng);
        let forecast = self.provider.daily_forecast(place.lat, place.lng);
        let (current, forecast) = tokio::join!(current, forecast);

        let current = current?;
        let day0 = match forecast {
            Ok(days) => days.into_iter().next(),
            Err(err) => {
                warn!(%err, "Forecast unavailable, snapshot omits daily extremes");
                None
            }
        };

        build_snapshot(place, current, day0.as_ref())
    }

    /// Build the anchored 5-day window for the chart endpoint.
    ///
    /// Days missing either temperature extreme are skipped rather than
    /// fabricated, so the window can hold fewer than five entries.
    #[instrument(skip(self))]
    pub async fn chart_series(&self, query: &LocationQuery) -> Result<ChartSeries> {
        let place = self.resolve_location(query).await?;

        let current = self.provider.current_conditions(place.lat, place.lng);
        let forecast = self.provider.daily_forecast(place.lat, place.lng);
        let (current, forecast) = tokio::join!(current, forecast);

        // The current pressure is only a fallback; its absence never fails
        // the chart request
        let current_pressure = match current {
            Ok(report) => report.pressure_mb,
            Err(err) => {
                warn!(%err, "Current conditions unavailable for pressure fallback");
                None
            }
        };

        let days = forecast?;
        let today = Utc::now().date_naive();
        let combined = build_window(&days, current_pressure, today);

        Ok(ChartSeries {
            city: place.city.clone(),
            coordinates: place.coordinates(),
            combined,
        })
    }

    /// Fetch and normalize the air-quality reading for a query
    #[instrument(skip(self))]
    pub async fn air_quality(&self, query: &LocationQuery) -> Result<AirQualitySample> {
        let place = self.resolve_location(query).await?;
        let report = self.provider.air_quality(place.lat, place.lng).await?;

        let Some(index) = report.indexes.into_iter().next() else {
            return Err(WeatherError::NoAirQualityData);
        };

        let (status, description) = normalize_category(&index.category);

        Ok(AirQualitySample {
            aqi: index.aqi,
            aqi_display: index
                .aqi_display
                .unwrap_or_else(|| index.aqi.to_string()),
            status,
            description,
            display_name: index
                .display_name
                .unwrap_or_else(|| "Universal AQI".to_string()),
            category: index.category,
            dominant_pollutant: index.dominant_pollutant,
            coordinates: place.coordinates(),
            estimated: false,
            pollutants: report
                .pollutants
                .into_iter()
                .map(|p| Pollutant {
                    code: p.code,
                    display_name: p.display_name,
                    value: p.value,
                    unit: p.unit,
                    sources: p.sources,
                    health_effects: p.health_effects,
                })
                .collect(),
            health_recommendation: report.general_recommendation,
        })
    }

    /// Free-text city search for autocomplete, capped at five results
    #[instrument(skip(self))]
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        let hits = self.provider.search_places(query).await?;
        Ok(hits
            .into_iter()
            .take(MAX_CITY_RESULTS)
            .map(|hit| CitySuggestion {
                name: hit.name,
                formatted_address: hit.formatted_address,
                location: Coordinates::new(hit.lat, hit.lng),
                place_id: hit.place_id,
            })
            .collect())
    }

    /// Reachability probe for the health endpoint: one current-conditions
    /// request against a fixed reference location
    pub async fn probe(&self) -> Result<()> {
        self.provider.current_conditions(28.7041, 77.1025).await?;
        Ok(())
    }
}

/// Convert km/h to m/s, rounded to one decimal
fn kmh_to_ms(kmh: f64) -> f64 {
    (kmh / 3.6 * 10.0).round() / 10.0
}

fn build_snapshot(
    place: ResolvedLocation,
    current: CurrentReport,
    day0: Option<&ForecastDayReport>,
) -> Result<WeatherSnapshot> {
    let Some(temperature) = current.temperature else {
        return Err(WeatherError::invalid_response(
            "Current conditions payload has no temperature",
        ));
    };

    let wind = Wind {
        speed_ms: current.wind_speed_kmh.map(kmh_to_ms),
        speed_kmh: current.wind_speed_kmh,
        direction_deg: current.wind_direction_deg,
        cardinal: current.wind_cardinal.clone().or_else(|| {
            current
                .wind_direction_deg
                .map(|deg| Wind::degrees_to_cardinal(deg).to_string())
        }),
        gust_ms: current.wind_gust_kmh.map(kmh_to_ms),
        gust_kmh: current.wind_gust_kmh,
    };

    Ok(WeatherSnapshot {
        place,
        condition: map_condition(current.condition_token.as_deref()),
        temperature,
        feels_like: current.feels_like.unwrap_or(temperature),
        temp_min: day0.and_then(|d| d.min_temp),
        temp_max: day0.and_then(|d| d.max_temp),
        humidity: current.humidity,
        pressure: current.pressure_mb,
        wind,
        visibility_m: current.visibility_km.map(|km| km * 1000.0),
        cloud_cover: current.cloud_cover,
        uv_index: current.uv_index,
        precip_probability: current.precip_probability,
        precip_amount_mm: current.precip_amount_mm,
        dew_point: current.dew_point,
        heat_index: current.heat_index,
        wind_chill: current.wind_chill,
        thunderstorm_probability: current.thunderstorm_probability,
        is_daytime: current.is_daytime,
        moon_phase: day0.and_then(|d| d.moon_phase.clone()),
        sunrise: day0.and_then(|d| d.sunrise),
        sunset: day0.and_then(|d| d.sunset),
        observed_at: Utc::now().timestamp(),
    })
}

/// Build the display window from the provider's forecast days.
///
/// Day labels are relative to `today`; the entry at [`ANCHOR_INDEX`] is
/// labeled "Today" and flagged current.
fn build_window(
    days: &[ForecastDayReport],
    current_pressure: Option<f64>,
    today: NaiveDate,
) -> Vec<ForecastDay> {
    let mut window = Vec::with_capacity(WINDOW_DAYS);

    for (index, day) in days.iter().take(WINDOW_DAYS).enumerate() {
        let (Some(min), Some(max)) = (day.min_temp, day.max_temp) else {
            warn!(index, "Skipping forecast day without temperature extremes");
            continue;
        };

        let offset = index as i64 - ANCHOR_INDEX as i64;
        let date = today + Duration::days(offset);

        window.push(ForecastDay {
            day: day_label(offset, date),
            day_name: date.format("%a").to_string(),
            date: date.format("%b %-d").to_string(),
            full_date: date.format("%Y-%m-%d").to_string(),
            temp_min: min,
            temp_max: max,
            temp_avg: (min + max) / 2.0,
            humidity: day.humidity_day.or(day.humidity_night),
            pressure: day
                .pressure_mb
                .or(current_pressure)
                .unwrap_or(STANDARD_PRESSURE_MB),
            weather: {
                let condition = map_condition(day.condition_token.as_deref());
                ForecastCondition {
                    main: condition.main,
                    icon: condition.icon,
                }
            },
            current: index == ANCHOR_INDEX,
            precip_probability: day
                .precip_probability_day
                .or(day.precip_probability_night),
            wind_speed_ms: day.wind_speed_kmh.map(kmh_to_ms),
            wind_speed_kmh: day.wind_speed_kmh,
            wind_direction: day.wind_cardinal.clone(),
            wind_gust_kmh: day.wind_gust_kmh,
            uv_index: day.uv_index,
            precip_amount_mm: day.precip_amount_mm,
        });
    }

    window
}

fn day_label(offset: i64, date: NaiveDate) -> String {
    match offset {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a").to_string(),
    }
}

/// Normalize a provider category string into a status label and description.
///
/// Lowercases, joins whitespace runs with underscores, and matches against
/// the known category table. Unknown categories keep their original text as
/// the status with a generated description.
fn normalize_category(category: &str) -> (String, String) {
    let normalized = category
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    match AqiStatus::from_normalized(&normalized) {
        Some(status) => (status.label().to_string(), status.description().to_string()),
        None => (
            category.to_string(),
            format!("Air quality is {}", category.to_lowercase()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{
        AirQualityReport, AqiIndexReport, GeocodeHit, PlaceHit, PollutantReport,
    };
    use async_trait::async_trait;
    use rstest::rstest;

    #[derive(Default)]
    struct MockProvider {
        geocode_hits: Vec<GeocodeHit>,
        reverse_hits: Vec<GeocodeHit>,
        current: Option<CurrentReport>,
        forecast: Vec<ForecastDayReport>,
        air: AirQualityReport,
        places: Vec<PlaceHit>,
    }

    fn delhi_hit() -> GeocodeHit {
        GeocodeHit {
            lat: 28.7041,
            lng: 77.1025,
            city: Some("Delhi".to_string()),
            country: Some("IN".to_string()),
            formatted_address: "Delhi, India".to_string(),
            place_id: "p1".to_string(),
        }
    }

    #[async_trait]
    impl WeatherProvider for MockProvider {
        async fn geocode(&self, _address: &str) -> Result<Vec<GeocodeHit>> {
            Ok(self.geocode_hits.clone())
        }

        async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Result<Vec<GeocodeHit>> {
            Ok(self.reverse_hits.clone())
        }

        async fn current_conditions(&self, _lat: f64, _lng: f64) -> Result<CurrentReport> {
            self.current
                .clone()
                .ok_or_else(|| WeatherError::upstream("current conditions down"))
        }

        async fn daily_forecast(&self, _lat: f64, _lng: f64) -> Result<Vec<ForecastDayReport>> {
            Ok(self.forecast.clone())
        }

        async fn air_quality(&self, _lat: f64, _lng: f64) -> Result<AirQualityReport> {
            Ok(self.air.clone())
        }

        async fn search_places(&self, _query: &str) -> Result<Vec<PlaceHit>> {
            Ok(self.places.clone())
        }
    }

    fn gateway(provider: MockProvider) -> Gateway {
        Gateway::new(Arc::new(provider))
    }

    fn forecast_day(min: f64, max: f64) -> ForecastDayReport {
        ForecastDayReport {
            min_temp: Some(min),
            max_temp: Some(max),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("London", LocationQuery::City("London".to_string()))]
    #[case("  New York  ", LocationQuery::City("New York".to_string()))]
    #[case(
        "28.7041, 77.1025",
        LocationQuery::Coordinates { lat: 28.7041, lng: 77.1025 }
    )]
    #[case(
        "-33.86,151.21",
        LocationQuery::Coordinates { lat: -33.86, lng: 151.21 }
    )]
    fn test_query_parse(#[case] input: &str, #[case] expected: LocationQuery) {
        assert_eq!(LocationQuery::parse(input).unwrap(), expected);
    }

    #[test]
    fn test_query_parse_rejects_empty() {
        assert!(matches!(
            LocationQuery::parse("   "),
            Err(WeatherError::LocationNotFound { .. })
        ));
    }

    #[test]
    fn test_query_parse_out_of_range_coordinates() {
        assert!(matches!(
            LocationQuery::parse("91.0, 10.0"),
            Err(WeatherError::LocationNotFound { .. })
        ));
        assert!(matches!(
            LocationQuery::parse("45.0, 181.0"),
            Err(WeatherError::LocationNotFound { .. })
        ));
    }

    #[test]
    fn test_comma_city_name_stays_a_city() {
        // A comma does not force coordinate parsing unless both halves are numeric
        assert_eq!(
            LocationQuery::parse("Paris, France").unwrap(),
            LocationQuery::City("Paris, France".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_city_not_found() {
        let gw = gateway(MockProvider::default());
        let err = gw
            .resolve_location(&LocationQuery::City("Atlantis".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_coordinates_degrades_to_unknown() {
        let gw = gateway(MockProvider::default());
        let place = gw
            .resolve_location(&LocationQuery::Coordinates {
                lat: 1.0,
                lng: 2.0,
            })
            .await
            .unwrap();
        assert_eq!(place.city, "Unknown");
        assert_eq!(place.country, "Unknown");
        assert_eq!(place.lat, 1.0);
    }

    #[tokio::test]
    async fn test_snapshot_requires_temperature() {
        let provider = MockProvider {
            geocode_hits: vec![delhi_hit()],
            current: Some(CurrentReport::default()),
            ..Default::default()
        };
        let err = gateway(provider)
            .current_snapshot(&LocationQuery::City("Delhi".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::InvalidUpstreamResponse { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_unit_conversions() {
        let provider = MockProvider {
            geocode_hits: vec![delhi_hit()],
            current: Some(CurrentReport {
                temperature: Some(30.0),
                wind_speed_kmh: Some(36.0),
                visibility_km: Some(8.0),
                ..Default::default()
            }),
            forecast: vec![ForecastDayReport {
                min_temp: Some(24.0),
                max_temp: Some(37.0),
                moon_phase: Some("FULL_MOON".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let snapshot = gateway(provider)
            .current_snapshot(&LocationQuery::City("Delhi".to_string()))
            .await
            .unwrap();

        assert_eq!(snapshot.temperature, 30.0);
        // feels_like falls back to the temperature
        assert_eq!(snapshot.feels_like, 30.0);
        assert_eq!(snapshot.wind.speed_ms, Some(10.0));
        assert_eq!(snapshot.wind.speed_kmh, Some(36.0));
        assert_eq!(snapshot.visibility_m, Some(8000.0));
        assert_eq!(snapshot.temp_min, Some(24.0));
        assert_eq!(snapshot.temp_max, Some(37.0));
        assert_eq!(snapshot.moon_phase.as_deref(), Some("FULL_MOON"));
    }

    #[test]
    fn test_window_anchor_and_labels() {
        let days: Vec<_> = (0..5).map(|i| forecast_day(10.0 + i as f64, 20.0)).collect();
        let today = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();

        let window = build_window(&days, None, today);

        assert_eq!(window.len(), 5);
        assert_eq!(window[1].day, "Yesterday");
        assert_eq!(window[2].day, "Today");
        assert!(window[2].current);
        assert_eq!(window[3].day, "Tomorrow");
        assert_eq!(window[0].full_date, "2026-07-02");
        assert_eq!(window[4].full_date, "2026-07-06");
        // Index 0 and 4 fall back to weekday names
        assert_eq!(window[0].day, window[0].day_name);
        assert_eq!(window[2].date, "Jul 4");
        assert!(!window[0].current && !window[4].current);
    }

    #[test]
    fn test_window_skips_days_without_extremes() {
        let mut days: Vec<_> = (0..5).map(|_| forecast_day(10.0, 20.0)).collect();
        days[1].max_temp = None;
        days[3].min_temp = None;
        let today = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();

        let window = build_window(&days, None, today);

        assert_eq!(window.len(), 3);
        // Surviving anchor day keeps its label and flag
        assert_eq!(window[1].day, "Today");
        assert!(window[1].current);
    }

    #[test]
    fn test_window_pressure_fallback_chain() {
        let mut days = vec![forecast_day(10.0, 20.0), forecast_day(11.0, 21.0)];
        days[0].pressure_mb = Some(998.0);
        let today = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();

        let with_current = build_window(&days, Some(1005.0), today);
        assert_eq!(with_current[0].pressure, 998.0);
        assert_eq!(with_current[1].pressure, 1005.0);

        let without_current = build_window(&days, None, today);
        assert_eq!(without_current[1].pressure, STANDARD_PRESSURE_MB);
    }

    #[test]
    fn test_window_temp_avg() {
        let days = vec![forecast_day(10.0, 21.0)];
        let today = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        let window = build_window(&days, None, today);
        assert_eq!(window[0].temp_avg, 15.5);
    }

    #[tokio::test]
    async fn test_air_quality_normalizes_category() {
        let provider = MockProvider {
            geocode_hits: vec![delhi_hit()],
            air: AirQualityReport {
                indexes: vec![AqiIndexReport {
                    aqi: 62,
                    aqi_display: None,
                    category: "Moderate air quality".to_string(),
                    display_name: None,
                    dominant_pollutant: Some("pm25".to_string()),
                }],
                pollutants: vec![PollutantReport {
                    code: "pm25".to_string(),
                    display_name: Some("PM2.5".to_string()),
                    value: Some(18.4),
                    unit: Some("MICROGRAMS_PER_CUBIC_METER".to_string()),
                    sources: None,
                    health_effects: None,
                }],
                general_recommendation: None,
            },
            ..Default::default()
        };

        let sample = gateway(provider)
            .air_quality(&LocationQuery::City("Delhi".to_string()))
            .await
            .unwrap();

        assert_eq!(sample.status, "Moderate");
        assert_eq!(sample.description, "Air quality is moderate");
        assert_eq!(sample.category, "Moderate air quality");
        assert_eq!(sample.aqi_display, "62");
        assert!(!sample.estimated);
        assert_eq!(sample.pollutants.len(), 1);
    }

    #[tokio::test]
    async fn test_air_quality_unknown_category_passes_through() {
        let provider = MockProvider {
            geocode_hits: vec![delhi_hit()],
            air: AirQualityReport {
                indexes: vec![AqiIndexReport {
                    aqi: 40,
                    aqi_display: Some("40".to_string()),
                    category: "Somewhat breezy".to_string(),
                    display_name: None,
                    dominant_pollutant: None,
                }],
                pollutants: Vec::new(),
                general_recommendation: None,
            },
            ..Default::default()
        };

        let sample = gateway(provider)
            .air_quality(&LocationQuery::City("Delhi".to_string()))
            .await
            .unwrap();

        assert_eq!(sample.status, "Somewhat breezy");
        assert_eq!(sample.description, "Air quality is somewhat breezy");
    }

    #[tokio::test]
    async fn test_air_quality_empty_indexes() {
        let provider = MockProvider {
            geocode_hits: vec![delhi_hit()],
            ..Default::default()
        };

        let err = gateway(provider)
            .air_quality(&LocationQuery::City("Delhi".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NoAirQualityData));
    }

    #[tokio::test]
    async fn test_city_search_caps_results() {
        let places: Vec<_> = (0..8)
            .map(|i| PlaceHit {
                name: format!("City {i}"),
                formatted_address: format!("City {i}, Country"),
                lat: i as f64,
                lng: i as f64,
                place_id: format!("p{i}"),
            })
            .collect();
        let provider = MockProvider {
            places,
            ..Default::default()
        };

        let suggestions = gateway(provider).search_cities("city").await.unwrap();
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0].name, "City 0");
    }
}
