//! Upstream API access for the aviation dashboard
//!
//! This module contains the source registry, the cache-first fetch
//! orchestrator, in-flight request coalescing, and the live-state
//! normalization that turns OpenSky's bare arrays into named records.

pub mod client;
pub mod error;
pub mod opensky;
pub mod singleflight;
pub mod sources;

pub use client::{ApiClient, BoundingBox, ClientStats, FlightQuery, Params};
pub use error::ApiError;
pub use opensky::{normalize_live_states, AircraftState, LiveAircraft};
pub use singleflight::{FetchOutcome, FlightRole, SingleFlight, SingleFlightStats};
pub use sources::ApiSource;
