//! Condition-token mapping
//!
//! The upstream provider reports weather conditions as uppercase tokens like
//! `HEAVY_RAIN` or `PARTLY_CLOUDY`. This module maps each token to a main
//! category, a human description, and an icon code. Unknown tokens degrade to
//! a partly-cloudy default instead of failing the request; missing core
//! numeric fields stay fatal elsewhere.

use crate::models::Condition;

/// Default icon used for unrecognized condition tokens
pub const DEFAULT_ICON: &str = "02d";
/// Default category used for unrecognized condition tokens
pub const DEFAULT_MAIN: &str = "Clouds";

/// Fixed token table: (token, main, description, icon)
const CONDITION_TABLE: &[(&str, &str, &str, &str)] = &[
    ("CLEAR", "Clear", "clear sky", "01d"),
    ("MOSTLY_CLEAR", "Clear", "mostly clear", "02d"),
    ("PARTLY_CLOUDY", "Clouds", "partly cloudy", "02d"),
    ("MOSTLY_CLOUDY", "Clouds", "mostly cloudy", "03d"),
    ("CLOUDY", "Clouds", "cloudy", "04d"),
    ("OVERCAST", "Clouds", "overcast", "04d"),
    ("FOG", "Mist", "fog", "50d"),
    ("LIGHT_FOG", "Mist", "light fog", "50d"),
    ("HAZE", "Mist", "haze", "50d"),
    ("DRIZZLE", "Rain", "drizzle", "10d"),
    ("LIGHT_RAIN", "Rain", "light rain", "10d"),
    ("RAIN", "Rain", "rain", "09d"),
    ("HEAVY_RAIN", "Rain", "heavy rain", "09d"),
    ("LIGHT_SNOW", "Snow", "light snow", "13d"),
    ("SNOW", "Snow", "snow", "13d"),
    ("HEAVY_SNOW", "Snow", "heavy snow", "13d"),
    ("FLURRIES", "Snow", "flurries", "13d"),
    ("FREEZING_RAIN", "Rain", "freezing rain", "13d"),
    ("FREEZING_DRIZZLE", "Rain", "freezing drizzle", "13d"),
    ("ICE_PELLETS", "Snow", "ice pellets", "13d"),
    ("THUNDERSTORM", "Thunderstorm", "thunderstorm", "11d"),
    ("HEAVY_THUNDERSTORM", "Thunderstorm", "heavy thunderstorm", "11d"),
    (
        "SCATTERED_THUNDERSTORMS",
        "Thunderstorm",
        "scattered thunderstorms",
        "11d",
    ),
    (
        "ISOLATED_THUNDERSTORMS",
        "Thunderstorm",
        "isolated thunderstorms",
        "11d",
    ),
];

/// Map a provider condition token to a normalized [`Condition`].
///
/// `None` or unrecognized tokens degrade to the partly-cloudy default with a
/// description generated from the token itself.
#[must_use]
pub fn map_condition(token: Option<&str>) -> Condition {
    let Some(token) = token else {
        tracing::warn!("No weather condition token in upstream payload, using default");
        return Condition {
            main: DEFAULT_MAIN.to_string(),
            description: "partly cloudy".to_string(),
            icon: DEFAULT_ICON.to_string(),
        };
    };

    if let Some((_, main, description, icon)) =
        CONDITION_TABLE.iter().find(|(t, _, _, _)| *t == token)
    {
        return Condition {
            main: (*main).to_string(),
            description: (*description).to_string(),
            icon: (*icon).to_string(),
        };
    }

    tracing::warn!(token, "Unknown weather condition token, using default");
    Condition {
        main: DEFAULT_MAIN.to_string(),
        description: token.to_lowercase().replace('_', " "),
        icon: DEFAULT_ICON.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CLEAR", "Clear", "01d")]
    #[case("HEAVY_RAIN", "Rain", "09d")]
    #[case("FREEZING_DRIZZLE", "Rain", "13d")]
    #[case("ICE_PELLETS", "Snow", "13d")]
    #[case("SCATTERED_THUNDERSTORMS", "Thunderstorm", "11d")]
    #[case("HAZE", "Mist", "50d")]
    fn test_known_tokens(#[case] token: &str, #[case] main: &str, #[case] icon: &str) {
        let condition = map_condition(Some(token));
        assert_eq!(condition.main, main);
        assert_eq!(condition.icon, icon);
    }

    #[test]
    fn test_unknown_token_degrades() {
        let condition = map_condition(Some("XYZZY"));
        assert_eq!(condition.main, "Clouds");
        assert_eq!(condition.icon, "02d");
        assert_eq!(condition.description, "xyzzy");
    }

    #[test]
    fn test_unknown_token_description_from_token() {
        let condition = map_condition(Some("VOLCANIC_ASH"));
        assert_eq!(condition.description, "volcanic ash");
        assert_eq!(condition.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_missing_token_degrades() {
        let condition = map_condition(None);
        assert_eq!(condition.main, "Clouds");
        assert_eq!(condition.icon, "02d");
    }

    #[test]
    fn test_table_covers_expected_range() {
        // Token families: clear, cloud, fog, rain, snow, thunder, freezing
        assert!(CONDITION_TABLE.len() >= 24);
    }
}
