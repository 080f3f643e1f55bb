//! Configuration for the `WeatherDeck` server
//!
//! Everything is sourced from the process environment: one credential for the
//! upstream provider and an optional port override. A missing credential is
//! logged rather than fatal so the process can still serve static assets.

use std::env;

use crate::{Result, WeatherError};

/// Default listen port when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3001;

/// Runtime configuration resolved at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the upstream provider (geocoding, weather, air quality)
    pub google_api_key: Option<String>,
    /// Port the HTTP server binds to
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let google_api_key = match env::var("GOOGLE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ => None,
        };

        if google_api_key.is_none() {
            tracing::warn!(
                "GOOGLE_API_KEY is not set; weather endpoints will fail until it is configured"
            );
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                WeatherError::config(format!("PORT must be a number between 1 and 65535, got '{raw}'"))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let config = Self {
            google_api_key,
            port,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = &self.google_api_key {
            if key.len() < 8 {
                return Err(WeatherError::config(
                    "API key appears to be invalid (too short). Please check your key.",
                ));
            }
            if key.len() > 100 {
                return Err(WeatherError::config(
                    "API key appears to be invalid (too long). Please check your key.",
                ));
            }
        }
        if self.port == 0 {
            return Err(WeatherError::config("PORT must not be 0"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            port: DEFAULT_PORT,
        }
    }
}
