//! Dashboard data feed
//!
//! The dashboard controller talks to a [`WeatherFeed`] rather than directly
//! to HTTP, so tests can drive it with canned data and alternate transports
//! stay possible.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::models::{AirQualitySample, ChartSeries, CitySuggestion, WeatherSnapshot};
use crate::Result;

/// Data source for the dashboard, one method per view
#[async_trait]
pub trait WeatherFeed: Send + Sync {
    async fn snapshot_by_city(&self, city: &str) -> Result<WeatherSnapshot>;

    async fn snapshot_by_coords(&self, lat: f64, lng: f64) -> Result<WeatherSnapshot>;

    async fn air_quality(&self, city: &str) -> Result<AirQualitySample>;

    async fn chart(&self, city: &str) -> Result<ChartSeries>;

    async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>>;
}

/// Error envelope carried by API error responses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Feed over the HTTP API
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeed {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("weatherdeck-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/api/{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let envelope: ErrorEnvelope = response.json().await.unwrap_or(ErrorEnvelope {
            error: String::new(),
            message: format!("Request failed with status {status}"),
        });

        if status == reqwest::StatusCode::NOT_FOUND && envelope.error == "City not found" {
            return Err(WeatherError::location_not_found(envelope.message));
        }
        Err(WeatherError::upstream(if envelope.message.is_empty() {
            format!("Request failed with status {status}")
        } else {
            envelope.message
        }))
    }
}

#[async_trait]
impl WeatherFeed for HttpFeed {
    async fn snapshot_by_city(&self, city: &str) -> Result<WeatherSnapshot> {
        self.get_json(&format!("weather/{}", urlencoding::encode(city)))
            .await
    }

    async fn snapshot_by_coords(&self, lat: f64, lng: f64) -> Result<WeatherSnapshot> {
        self.get_json(&format!("weather/coords/{lat}/{lng}")).await
    }

    async fn air_quality(&self, city: &str) -> Result<AirQualitySample> {
        self.get_json(&format!("air-quality/{}", urlencoding::encode(city)))
            .await
    }

    async fn chart(&self, city: &str) -> Result<ChartSeries> {
        self.get_json(&format!("weather-chart/{}", urlencoding::encode(city)))
            .await
    }

    async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        self.get_json(&format!("cities/search/{}", urlencoding::encode(query)))
            .await
    }
}
