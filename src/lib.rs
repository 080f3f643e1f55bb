//! `WeatherDeck` - weather dashboard gateway and headless dashboard controller
//!
//! This library provides the upstream gateway (location resolution, current
//! conditions, 5-day forecast window, air quality) behind a stable JSON
//! schema, plus the client-side dashboard state machine and chart geometry
//! pipeline.

pub mod api;
pub mod chart;
pub mod conditions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod web;

// Re-export core types for public API
pub use chart::{ChartGeometry, ChartMetric, ChartPanel};
pub use config::AppConfig;
pub use dashboard::Dashboard;
pub use error::WeatherError;
pub use gateway::{Gateway, LocationQuery};
pub use models::{AirQualitySample, ChartSeries, ForecastDay, ResolvedLocation, WeatherSnapshot};
pub use provider::WeatherProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
