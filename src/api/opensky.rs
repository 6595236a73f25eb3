//! OpenSky state-vector normalization
//!
//! OpenSky's `states/all` endpoint returns each aircraft as a bare
//! 17-element array in a fixed order. This module flattens those vectors
//! into named fields for the dashboard, dropping aircraft without a
//! position fix. Normalization happens after the cache boundary, so the
//! cached payload stays in the raw upstream shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Positions within an OpenSky state vector
const IDX_ICAO24: usize = 0;
const IDX_CALLSIGN: usize = 1;
const IDX_ORIGIN_COUNTRY: usize = 2;
const IDX_LONGITUDE: usize = 5;
const IDX_LATITUDE: usize = 6;
const IDX_BARO_ALTITUDE: usize = 7;
const IDX_ON_GROUND: usize = 8;
const IDX_VELOCITY: usize = 9;
const IDX_TRUE_TRACK: usize = 10;
const IDX_VERTICAL_RATE: usize = 11;

/// One live aircraft, flattened from OpenSky's array form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    /// ICAO 24-bit transponder address, lowercase hex
    pub icao24: String,
    /// Reported callsign, trimmed; `"N/A"` when absent or blank
    pub callsign: String,
    /// Country the aircraft is registered in
    pub origin_country: String,
    /// Position in decimal degrees
    pub longitude: f64,
    pub latitude: f64,
    /// Barometric altitude in metres, if reported
    pub altitude: Option<f64>,
    /// Whether the aircraft is on the ground
    pub on_ground: bool,
    /// Ground speed in metres per second, if reported
    pub velocity: Option<f64>,
    /// True track in degrees clockwise from north, if reported
    pub heading: Option<f64>,
    /// Climb rate in metres per second, if reported
    pub vertical_rate: Option<f64>,
}

/// Normalized live-aircraft snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveAircraft {
    /// Snapshot time reported by upstream, unix seconds
    pub time: Option<i64>,
    /// Number of aircraft carrying a position fix
    pub count: usize,
    pub aircraft: Vec<AircraftState>,
}

/// Flattens a raw `states/all` payload into dashboard form
///
/// Vectors missing either coordinate are skipped; a live map cannot place
/// them. Entries that are not arrays at all are skipped the same way.
pub fn normalize_live_states(payload: &Value) -> LiveAircraft {
    let time = payload.get("time").and_then(Value::as_i64);
    let aircraft: Vec<AircraftState> = payload
        .get("states")
        .and_then(Value::as_array)
        .map(|states| states.iter().filter_map(parse_state).collect())
        .unwrap_or_default();
    LiveAircraft {
        time,
        count: aircraft.len(),
        aircraft,
    }
}

/// Parses one state vector, returning `None` when it has no position fix
fn parse_state(state: &Value) -> Option<AircraftState> {
    let vector = state.as_array()?;
    let longitude = vector.get(IDX_LONGITUDE)?.as_f64()?;
    let latitude = vector.get(IDX_LATITUDE)?.as_f64()?;
    let icao24 = vector.get(IDX_ICAO24)?.as_str()?.to_string();

    let callsign = match vector.get(IDX_CALLSIGN).and_then(Value::as_str) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => "N/A".to_string(),
    };
    let origin_country = vector
        .get(IDX_ORIGIN_COUNTRY)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(AircraftState {
        icao24,
        callsign,
        origin_country,
        longitude,
        latitude,
        altitude: vector.get(IDX_BARO_ALTITUDE).and_then(Value::as_f64),
        on_ground: vector
            .get(IDX_ON_GROUND)
            .and_then(Value::as_bool)
            .unwrap_or(false),
        velocity: vector.get(IDX_VELOCITY).and_then(Value::as_f64),
        heading: vector.get(IDX_TRUE_TRACK).and_then(Value::as_f64),
        vertical_rate: vector.get(IDX_VERTICAL_RATE).and_then(Value::as_f64),
    })
}
