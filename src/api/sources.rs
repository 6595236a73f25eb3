//! Registry of the upstream services the dashboard draws from
//!
//! Each source carries its identifier, base URL, auth convention, and the
//! freshness class of its endpoints, so the fetch orchestrator never
//! hard-codes per-service knowledge.

use crate::cache::DEFAULT_TTL_HOURS;
use chrono::Duration;
use std::fmt;

/// Base URL for the AviationStack flight data API
pub const AVIATIONSTACK_BASE_URL: &str = "http://api.aviationstack.com/v1";

/// Base URL for the OpenWeatherMap current weather API
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Base URL for the OpenSky Network live aircraft API
pub const OPENSKY_BASE_URL: &str = "https://opensky-network.org/api";

/// Freshness window for live aircraft position feeds, in seconds
///
/// State vectors churn continuously; anything older than half a minute is
/// useless on a live map, while refetching more often than that burns the
/// anonymous rate limit for no visible gain.
pub const LIVE_STATES_TTL_SECONDS: i64 = 30;

/// Endpoint serving live aircraft state vectors on OpenSky
pub const LIVE_STATES_ENDPOINT: &str = "states/all";

/// An upstream API the dashboard fetches from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiSource {
    /// Flight schedules, airports, airlines, and fleet directories
    AviationStack,
    /// Current weather by city
    OpenWeather,
    /// Live aircraft state vectors and aircraft metadata
    OpenSky,
}

impl ApiSource {
    /// Stable identifier used in cache keys and error messages
    pub fn id(&self) -> &'static str {
        match self {
            ApiSource::AviationStack => "aviationstack",
            ApiSource::OpenWeather => "openweather",
            ApiSource::OpenSky => "opensky",
        }
    }

    /// Default base URL for this source
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ApiSource::AviationStack => AVIATIONSTACK_BASE_URL,
            ApiSource::OpenWeather => OPENWEATHER_BASE_URL,
            ApiSource::OpenSky => OPENSKY_BASE_URL,
        }
    }

    /// Query parameter carrying the API key, for sources that need one
    ///
    /// OpenSky's public endpoints are anonymous.
    pub fn auth_param(&self) -> Option<&'static str> {
        match self {
            ApiSource::AviationStack => Some("access_key"),
            ApiSource::OpenWeather => Some("appid"),
            ApiSource::OpenSky => None,
        }
    }

    /// Freshness window for an endpoint on this source
    ///
    /// Live position feeds go stale in seconds; directory-style data
    /// (airports, airlines, weather snapshots) keeps for a day.
    pub fn freshness_for(&self, endpoint: &str) -> Duration {
        match (self, endpoint) {
            (ApiSource::OpenSky, LIVE_STATES_ENDPOINT) => {
                Duration::seconds(LIVE_STATES_TTL_SECONDS)
            }
            _ => Duration::hours(DEFAULT_TTL_HOURS),
        }
    }
}

impl fmt::Display for ApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(ApiSource::AviationStack.id(), "aviationstack");
        assert_eq!(ApiSource::OpenWeather.id(), "openweather");
        assert_eq!(ApiSource::OpenSky.id(), "opensky");
    }

    #[test]
    fn test_auth_params() {
        assert_eq!(ApiSource::AviationStack.auth_param(), Some("access_key"));
        assert_eq!(ApiSource::OpenWeather.auth_param(), Some("appid"));
        assert_eq!(ApiSource::OpenSky.auth_param(), None);
    }

    #[test]
    fn test_live_states_freshness_is_seconds() {
        let window = ApiSource::OpenSky.freshness_for(LIVE_STATES_ENDPOINT);
        assert_eq!(window, Duration::seconds(30));
    }

    #[test]
    fn test_directory_endpoints_keep_for_a_day() {
        assert_eq!(
            ApiSource::AviationStack.freshness_for("airports"),
            Duration::hours(24)
        );
        assert_eq!(
            ApiSource::OpenWeather.freshness_for("weather"),
            Duration::hours(24)
        );
        // Aircraft metadata is not a live feed even though it lives on OpenSky
        assert_eq!(
            ApiSource::OpenSky.freshness_for("aircraft/icao/abc123"),
            Duration::hours(24)
        );
    }

    #[test]
    fn test_display_matches_id() {
        assert_eq!(ApiSource::OpenSky.to_string(), "opensky");
    }
}
