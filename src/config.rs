//! Runtime configuration for upstream API access
//!
//! Keys and URL overrides come from the environment; tests and embedders
//! use the builder methods instead. A missing key is not an error here:
//! the affected source simply sends no auth parameter and the upstream
//! reports the rejection.

use crate::api::ApiSource;
use std::env;
use std::time::Duration;

/// Default upstream request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable holding the AviationStack API key
pub const AVIATIONSTACK_KEY_VAR: &str = "AVIATIONSTACK_API_KEY";

/// Environment variable holding the OpenWeatherMap API key
pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

/// Environment variable overriding the OpenSky base URL
pub const OPENSKY_BASE_URL_VAR: &str = "OPENSKY_BASE_URL";

/// Connection settings for the upstream APIs
#[derive(Debug, Clone)]
pub struct ApiConfig {
    aviationstack_key: Option<String>,
    openweather_key: Option<String>,
    aviationstack_base_url: String,
    openweather_base_url: String,
    opensky_base_url: String,
    timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            aviationstack_key: None,
            openweather_key: None,
            aviationstack_base_url: ApiSource::AviationStack.default_base_url().to_string(),
            openweather_base_url: ApiSource::OpenWeather.default_base_url().to_string(),
            opensky_base_url: ApiSource::OpenSky.default_base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Builds a configuration from the process environment
    pub fn from_env() -> Self {
        let opensky_base_url = env::var(OPENSKY_BASE_URL_VAR)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| ApiSource::OpenSky.default_base_url().to_string());
        Self {
            aviationstack_key: env::var(AVIATIONSTACK_KEY_VAR)
                .ok()
                .filter(|key| !key.is_empty()),
            openweather_key: env::var(OPENWEATHER_KEY_VAR)
                .ok()
                .filter(|key| !key.is_empty()),
            opensky_base_url,
            ..Self::default()
        }
    }

    /// Sets the API key for a source
    ///
    /// Ignored for OpenSky, which takes no key.
    pub fn with_api_key(mut self, source: ApiSource, key: impl Into<String>) -> Self {
        match source {
            ApiSource::AviationStack => self.aviationstack_key = Some(key.into()),
            ApiSource::OpenWeather => self.openweather_key = Some(key.into()),
            ApiSource::OpenSky => {}
        }
        self
    }

    /// Overrides the base URL for a source
    pub fn with_base_url(mut self, source: ApiSource, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        match source {
            ApiSource::AviationStack => self.aviationstack_base_url = base_url,
            ApiSource::OpenWeather => self.openweather_base_url = base_url,
            ApiSource::OpenSky => self.opensky_base_url = base_url,
        }
        self
    }

    /// Overrides the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL requests to `source` are built against
    pub fn base_url(&self, source: ApiSource) -> &str {
        match source {
            ApiSource::AviationStack => &self.aviationstack_base_url,
            ApiSource::OpenWeather => &self.openweather_base_url,
            ApiSource::OpenSky => &self.opensky_base_url,
        }
    }

    /// API key for `source`, if one is configured and the source uses keys
    pub fn api_key(&self, source: ApiSource) -> Option<&str> {
        match source {
            ApiSource::AviationStack => self.aviationstack_key.as_deref(),
            ApiSource::OpenWeather => self.openweather_key.as_deref(),
            ApiSource::OpenSky => None,
        }
    }

    /// Upstream request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls() {
        let config = ApiConfig::default();

        assert_eq!(
            config.base_url(ApiSource::AviationStack),
            "http://api.aviationstack.com/v1"
        );
        assert_eq!(
            config.base_url(ApiSource::OpenWeather),
            "https://api.openweathermap.org/data/2.5"
        );
        assert_eq!(
            config.base_url(ApiSource::OpenSky),
            "https://opensky-network.org/api"
        );
    }

    #[test]
    fn test_default_has_no_keys() {
        let config = ApiConfig::default();

        assert_eq!(config.api_key(ApiSource::AviationStack), None);
        assert_eq!(config.api_key(ApiSource::OpenWeather), None);
    }

    #[test]
    fn test_with_api_key_sets_key() {
        let config = ApiConfig::default()
            .with_api_key(ApiSource::AviationStack, "secret_a")
            .with_api_key(ApiSource::OpenWeather, "secret_b");

        assert_eq!(config.api_key(ApiSource::AviationStack), Some("secret_a"));
        assert_eq!(config.api_key(ApiSource::OpenWeather), Some("secret_b"));
    }

    #[test]
    fn test_opensky_never_has_a_key() {
        let config = ApiConfig::default().with_api_key(ApiSource::OpenSky, "ignored");

        assert_eq!(config.api_key(ApiSource::OpenSky), None);
    }

    #[test]
    fn test_with_base_url_overrides_one_source() {
        let config =
            ApiConfig::default().with_base_url(ApiSource::OpenSky, "http://localhost:9000");

        assert_eq!(config.base_url(ApiSource::OpenSky), "http://localhost:9000");
        assert_eq!(
            config.base_url(ApiSource::AviationStack),
            "http://api.aviationstack.com/v1"
        );
    }

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        let config = ApiConfig::default();

        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_with_timeout_overrides() {
        let config = ApiConfig::default().with_timeout(Duration::from_millis(250));

        assert_eq!(config.timeout(), Duration::from_millis(250));
    }
}
