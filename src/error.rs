//! Error types and handling for the `WeatherDeck` application

use thiserror::Error;

/// Main error type for the `WeatherDeck` application
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The user's query could not be resolved to a place
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Network failure, timeout, or non-2xx status from the upstream provider
    #[error("Upstream provider unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// The provider answered 2xx but the payload is missing required fields
    #[error("Invalid upstream response: {message}")]
    InvalidUpstreamResponse { message: String },

    /// The provider returned an empty air-quality index list
    #[error("No air quality data available for this location")]
    NoAirQualityData,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Local state store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new upstream-unavailable error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a new invalid-response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidUpstreamResponse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::LocationNotFound { query } => {
                format!("Could not find \"{query}\". Please check the spelling and try again.")
            }
            WeatherError::UpstreamUnavailable { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            WeatherError::InvalidUpstreamResponse { .. } => {
                "The weather service returned unexpected data. Please try again later.".to_string()
            }
            WeatherError::NoAirQualityData => {
                "Air quality data is not available for this location.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your API key setup.".to_string()
            }
            WeatherError::Storage { .. } => {
                "Saved preferences could not be read or written.".to_string()
            }
            WeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::invalid_response(err.to_string())
        } else {
            WeatherError::upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let not_found = WeatherError::location_not_found("Atlantis");
        assert!(matches!(not_found, WeatherError::LocationNotFound { .. }));

        let upstream = WeatherError::upstream("connection refused");
        assert!(matches!(upstream, WeatherError::UpstreamUnavailable { .. }));

        let invalid = WeatherError::invalid_response("missing temperature");
        assert!(matches!(
            invalid,
            WeatherError::InvalidUpstreamResponse { .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        let not_found = WeatherError::location_not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));

        let upstream = WeatherError::upstream("test");
        assert!(upstream.user_message().contains("Unable to reach"));

        assert!(
            WeatherError::NoAirQualityData
                .user_message()
                .contains("not available")
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let weather_err: WeatherError = io_err.into();
        assert!(matches!(weather_err, WeatherError::Io { .. }));
    }
}
