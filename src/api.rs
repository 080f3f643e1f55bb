//! HTTP API surface
//!
//! Thin axum handlers over the [`Gateway`]: path extraction, error-envelope
//! mapping, and nothing else. All weather logic lives in the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::WeatherError;
use crate::gateway::{Gateway, LocationQuery};
use crate::models::{AirQualitySample, ChartSeries, CitySuggestion, WeatherSnapshot};

/// How long the health endpoint waits for the upstream probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather/{city}", get(weather_by_city))
        .route("/weather/coords/{lat}/{lng}", get(weather_by_coords))
        .route("/weather-chart/{city}", get(weather_chart))
        .route("/air-quality/{city}", get(air_quality))
        .route("/cities/search/{query}", get(search_cities))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

/// Uniform error envelope: `error` is the short machine-facing label,
/// `message` the user-facing text, `details` the internal error display
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, label) = match &err {
            WeatherError::LocationNotFound { .. } => (StatusCode::NOT_FOUND, "City not found"),
            WeatherError::NoAirQualityData => {
                (StatusCode::NOT_FOUND, "No air quality data available")
            }
            WeatherError::Config { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "API key not configured")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data"),
        };

        if status.is_server_error() {
            tracing::error!(%err, "Request failed");
        }

        let body = ErrorBody {
            error: label.to_string(),
            message: err.user_message(),
            details: status.is_server_error().then(|| err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

async fn weather_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let query = LocationQuery::parse(&city)?;
    let snapshot = state.gateway.current_snapshot(&query).await?;
    Ok(Json(snapshot))
}

async fn weather_by_coords(
    State(state): State<AppState>,
    Path((lat, lng)): Path<(f64, f64)>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let query = LocationQuery::coordinates(lat, lng)?;
    let snapshot = state.gateway.current_snapshot(&query).await?;
    Ok(Json(snapshot))
}

async fn weather_chart(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<ChartSeries>, ApiError> {
    let query = LocationQuery::parse(&city)?;
    let series = state.gateway.chart_series(&query).await?;
    Ok(Json(series))
}

async fn air_quality(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<AirQualitySample>, ApiError> {
    let query = LocationQuery::parse(&city)?;
    let sample = state.gateway.air_quality(&query).await?;
    Ok(Json(sample))
}

async fn search_cities(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<CitySuggestion>>, ApiError> {
    let suggestions = state.gateway.search_cities(&query).await?;
    Ok(Json(suggestions))
}

/// Liveness plus a bounded upstream reachability probe. The probe failing
/// never fails the endpoint; it only changes the reported upstream state.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let upstream = match tokio::time::timeout(PROBE_TIMEOUT, state.gateway.probe()).await {
        Ok(Ok(())) => "ok",
        Ok(Err(err)) => {
            tracing::warn!(%err, "Health probe failed");
            "unreachable"
        }
        Err(_) => {
            tracing::warn!("Health probe timed out");
            "timeout"
        }
    };

    Json(json!({
        "status": "ok",
        "upstream": upstream,
        "version": crate::VERSION,
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "API endpoint not found" })),
    )
}
