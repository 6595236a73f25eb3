//! Cache-first fetch orchestration for the upstream APIs
//!
//! Every request flows through the same path: build a deterministic cache
//! key, serve a fresh cached payload if one exists, otherwise coalesce
//! with any identical in-flight fetch and go upstream at most once.
//! Successful payloads are written through to the cache; failures are
//! returned to every coalesced caller and never cached.

use crate::api::error::ApiError;
use crate::api::opensky::{self, LiveAircraft};
use crate::api::singleflight::{FetchOutcome, FlightRole, SingleFlight};
use crate::api::sources::{ApiSource, LIVE_STATES_ENDPOINT};
use crate::cache::CacheManager;
use crate::config::ApiConfig;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Default page size for AviationStack directory queries
const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Ordered query parameters
///
/// A `BTreeMap` keeps iteration sorted by key, so two callers building the
/// same logical query in different orders produce the same cache key.
pub type Params = BTreeMap<String, String>;

/// Builds the cache key for a request
///
/// The sorted pairs are rendered with `Debug` quoting, so values containing
/// the separator cannot collide with differently-split parameter names.
pub(crate) fn cache_key(source: ApiSource, endpoint: &str, params: &Params) -> String {
    let pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    format!("{}_{}_{:?}", source.id(), endpoint, pairs)
}

/// Optional filters for flight searches
#[derive(Debug, Clone, Default)]
pub struct FlightQuery {
    /// Flight IATA code, e.g. `AA100`
    pub flight_iata: Option<String>,
    /// Departure airport IATA code
    pub dep_iata: Option<String>,
    /// Arrival airport IATA code
    pub arr_iata: Option<String>,
    /// Operating airline IATA code
    pub airline_iata: Option<String>,
    /// Status filter: `scheduled`, `active`, `landed`, `cancelled`
    pub flight_status: Option<String>,
    /// Page size, defaults to 100
    pub limit: Option<u32>,
}

impl FlightQuery {
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert(
            "limit".to_string(),
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).to_string(),
        );
        let filters = [
            ("flight_iata", &self.flight_iata),
            ("dep_iata", &self.dep_iata),
            ("arr_iata", &self.arr_iata),
            ("airline_iata", &self.airline_iata),
            ("flight_status", &self.flight_status),
        ];
        for (name, value) in filters {
            if let Some(value) = value {
                params.insert(name.to_string(), value.clone());
            }
        }
        params
    }
}

/// Geographic bounding box for live-state queries
///
/// All four corners are required; a partial box is rejected locally
/// before any cache or network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    /// Minimum latitude in decimal degrees
    pub lamin: Option<f64>,
    /// Minimum longitude in decimal degrees
    pub lomin: Option<f64>,
    /// Maximum latitude in decimal degrees
    pub lamax: Option<f64>,
    /// Maximum longitude in decimal degrees
    pub lomax: Option<f64>,
}

impl BoundingBox {
    /// Builds a fully specified box
    pub fn new(lamin: f64, lomin: f64, lamax: f64, lomax: f64) -> Self {
        Self {
            lamin: Some(lamin),
            lomin: Some(lomin),
            lamax: Some(lamax),
            lomax: Some(lomax),
        }
    }

    /// Converts to query parameters, or names the missing corners
    fn to_params(&self) -> Result<Params, String> {
        match (self.lamin, self.lomin, self.lamax, self.lomax) {
            (Some(lamin), Some(lomin), Some(lamax), Some(lomax)) => {
                let mut params = Params::new();
                params.insert("lamin".to_string(), lamin.to_string());
                params.insert("lomin".to_string(), lomin.to_string());
                params.insert("lamax".to_string(), lamax.to_string());
                params.insert("lomax".to_string(), lomax.to_string());
                Ok(params)
            }
            _ => {
                let mut missing = Vec::new();
                if self.lamin.is_none() {
                    missing.push("lamin");
                }
                if self.lomin.is_none() {
                    missing.push("lomin");
                }
                if self.lamax.is_none() {
                    missing.push("lamax");
                }
                if self.lomax.is_none() {
                    missing.push("lomax");
                }
                Err(missing.join(", "))
            }
        }
    }
}

/// Request counters for operational visibility
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ClientStats {
    /// Requests served from cache
    pub cache_hits: u64,
    /// Upstream HTTP calls actually performed
    pub upstream_calls: u64,
    /// Requests that waited on another caller's fetch
    pub coalesced: u64,
}

/// Client for the dashboard's upstream APIs
///
/// Holds the HTTP client, the source configuration, the shared cache, and
/// the in-flight fetch table. Clones share all of that state, so route
/// handlers or CLI commands can each hold their own handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for making requests
    http_client: reqwest::Client,
    /// Keys, base URLs, and timeout
    config: ApiConfig,
    /// Cache manager for persisting responses
    cache_manager: CacheManager,
    /// Coalesces concurrent fetches of one key
    flights: SingleFlight,
    cache_hits: Arc<AtomicU64>,
    upstream_calls: Arc<AtomicU64>,
}

impl ApiClient {
    /// Creates a client over the given configuration and cache
    pub fn new(config: ApiConfig, cache_manager: CacheManager) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
            cache_manager,
            flights: SingleFlight::new(),
            cache_hits: Arc::new(AtomicU64::new(0)),
            upstream_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the cache manager backing this client
    pub fn cache(&self) -> &CacheManager {
        &self.cache_manager
    }

    /// Returns a snapshot of the request counters
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            upstream_calls: self.upstream_calls.load(Ordering::Relaxed),
            coalesced: self.flights.stats().coalesced,
        }
    }

    /// Fetches an endpoint, serving from cache when possible
    ///
    /// # Arguments
    /// * `source` - Which upstream API to query
    /// * `endpoint` - Path relative to the source's base URL
    /// * `params` - Query parameters; auth is added separately and never
    ///   affects the cache key
    ///
    /// # Returns
    /// * `Ok(Value)` - The decoded response payload, cached or fresh
    /// * `Err(ApiError)` - Transport or upstream failure; never cached
    ///
    /// # Behavior
    /// - A cached payload fresher than the endpoint's window is returned
    ///   without touching the network
    /// - Concurrent misses for the same key coalesce into one upstream call
    /// - Successful payloads are written through to the cache; expired
    ///   entries were already evicted by the read that missed
    pub async fn fetch(
        &self,
        source: ApiSource,
        endpoint: &str,
        params: &Params,
    ) -> Result<Value, ApiError> {
        let key = cache_key(source, endpoint, params);
        let ttl = source.freshness_for(endpoint);

        if let Some(payload) = self.cache_manager.get_with_ttl(&key, ttl) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(payload);
        }

        match self.flights.join(&key).await {
            FlightRole::Leader(sender) => {
                let outcome = self.fetch_and_store(&key, source, endpoint, params).await;
                self.flights.complete(&key, sender, outcome.clone()).await;
                outcome
            }
            FlightRole::Waiter(mut rx) => match rx.recv().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    // The leading fetch went away without completing
                    warn!(key, "in-flight fetch dropped, fetching directly");
                    self.fetch_and_store(&key, source, endpoint, params).await
                }
            },
        }
    }

    /// Performs the upstream call and caches a successful payload
    async fn fetch_and_store(
        &self,
        key: &str,
        source: ApiSource,
        endpoint: &str,
        params: &Params,
    ) -> FetchOutcome {
        let outcome = self.fetch_upstream(source, endpoint, params).await;
        if let Ok(payload) = &outcome {
            if let Err(e) = self.cache_manager.set(key, payload.clone()) {
                warn!(key, error = %e, "failed to persist cached response");
            }
        }
        outcome
    }

    /// Performs one HTTP request against the source
    async fn fetch_upstream(
        &self,
        source: ApiSource,
        endpoint: &str,
        params: &Params,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.config.base_url(source), endpoint);
        let mut query: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        // Auth joins the request only; cache keys never see it
        if let Some(auth_param) = source.auth_param() {
            if let Some(api_key) = self.config.api_key(source) {
                query.push((auth_param.to_string(), api_key.to_string()));
            }
        }

        self.upstream_calls.fetch_add(1, Ordering::Relaxed);
        info!(source = %source, endpoint, "fetching from upstream");

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                source_id: source,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ApiError::Upstream {
                source_id: source,
                status: Some(429),
                message: "rate limit exceeded, try again later".to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Upstream {
                source_id: source,
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("upstream request failed")
                    .to_string(),
            });
        }

        let payload: Value = response.json().await.map_err(|e| ApiError::Transport {
            source_id: source,
            message: e.to_string(),
        })?;

        // AviationStack reports failures inside a 200 body
        if let Some(error) = payload.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ApiError::Upstream {
                source_id: source,
                status: None,
                message,
            });
        }

        Ok(payload)
    }

    /// Searches flights, optionally filtered by route, airline, or status
    pub async fn flights(&self, query: &FlightQuery) -> Result<Value, ApiError> {
        self.fetch(ApiSource::AviationStack, "flights", &query.to_params())
            .await
    }

    /// Lists airports
    pub async fn airports(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        self.fetch(ApiSource::AviationStack, "airports", &limit_params(limit))
            .await
    }

    /// Lists airlines
    pub async fn airlines(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        self.fetch(ApiSource::AviationStack, "airlines", &limit_params(limit))
            .await
    }

    /// Lists registered airframes
    pub async fn airplanes(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        self.fetch(ApiSource::AviationStack, "airplanes", &limit_params(limit))
            .await
    }

    /// Current weather for a city, in metric units
    pub async fn city_weather(&self, city: &str) -> Result<Value, ApiError> {
        let mut params = Params::new();
        params.insert("q".to_string(), city.to_string());
        params.insert("units".to_string(), "metric".to_string());
        self.fetch(ApiSource::OpenWeather, "weather", &params).await
    }

    /// Raw live state vectors for all tracked aircraft
    ///
    /// Served under the short live-feed freshness window.
    pub async fn live_states(&self) -> Result<Value, ApiError> {
        self.fetch(ApiSource::OpenSky, LIVE_STATES_ENDPOINT, &Params::new())
            .await
    }

    /// Raw live state vectors inside a bounding box
    ///
    /// A partially specified box is rejected with
    /// [`ApiError::MissingParameters`] before any cache or network access.
    pub async fn live_states_in_box(&self, bbox: &BoundingBox) -> Result<Value, ApiError> {
        let params = bbox
            .to_params()
            .map_err(|missing| ApiError::MissingParameters { missing })?;
        self.fetch(ApiSource::OpenSky, LIVE_STATES_ENDPOINT, &params)
            .await
    }

    /// Live aircraft in dashboard form, positions only
    pub async fn live_aircraft(&self) -> Result<LiveAircraft, ApiError> {
        let payload = self.live_states().await?;
        Ok(opensky::normalize_live_states(&payload))
    }

    /// Live aircraft inside a bounding box, in dashboard form
    pub async fn live_aircraft_in_box(&self, bbox: &BoundingBox) -> Result<LiveAircraft, ApiError> {
        let payload = self.live_states_in_box(bbox).await?;
        Ok(opensky::normalize_live_states(&payload))
    }

    /// Metadata for one aircraft by its ICAO 24-bit address
    pub async fn aircraft_by_icao(&self, icao24: &str) -> Result<Value, ApiError> {
        self.fetch(
            ApiSource::OpenSky,
            &format!("aircraft/icao/{}", icao24),
            &Params::new(),
        )
        .await
    }
}

fn limit_params(limit: Option<u32>) -> Params {
    let mut params = Params::new();
    params.insert(
        "limit".to_string(),
        limit.unwrap_or(DEFAULT_PAGE_LIMIT).to_string(),
    );
    params
}
