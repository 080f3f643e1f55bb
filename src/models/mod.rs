//! Internal data models
//!
//! These are the stable shapes the gateway produces from heterogeneous
//! upstream payloads, and the shapes the dashboard consumes.

mod air_quality;
mod forecast;
mod location;
mod weather;

pub use air_quality::{AirQualitySample, AqiStatus, Pollutant};
pub use forecast::{ChartSeries, ForecastCondition, ForecastDay};
pub use location::{CitySuggestion, Coordinates, ResolvedLocation};
pub use weather::{Condition, WeatherSnapshot, Wind};
