//! Location models for resolved places and city search results

use serde::{Deserialize, Serialize};

/// Geographic coordinates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Format as a `"lat, lng"` display string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A fully resolved place: coordinates plus city and country names.
///
/// The gateway never returns a partially built value of this type; resolution
/// either succeeds completely or fails.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    /// City name, `"Unknown"` when the provider carries no locality
    pub city: String,
    /// Country code (short form), `"Unknown"` when absent
    pub country: String,
}

impl ResolvedLocation {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// One autocomplete candidate from the place-search endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CitySuggestion {
    pub name: String,
    pub formatted_address: String,
    pub location: Coordinates,
    pub place_id: String,
}
