//! Command-line interface parsing for skyhub
//!
//! This module defines the subcommand tree with clap. Each subcommand maps
//! onto one client call; the binary glues parsed arguments to the library
//! and prints the JSON result.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// skyhub - aviation dashboard data with a persistent response cache
#[derive(Parser, Debug)]
#[command(name = "skyhub")]
#[command(about = "Fetch flight, weather, and live aircraft data through a response cache")]
#[command(version)]
pub struct Cli {
    /// Cache file location (defaults to the platform cache directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search flights, optionally filtered by route, airline, or status
    Flights {
        /// Flight IATA code, e.g. AA100
        #[arg(long, value_name = "CODE")]
        flight_iata: Option<String>,
        /// Departure airport IATA code
        #[arg(long, value_name = "CODE")]
        dep_iata: Option<String>,
        /// Arrival airport IATA code
        #[arg(long, value_name = "CODE")]
        arr_iata: Option<String>,
        /// Operating airline IATA code
        #[arg(long, value_name = "CODE")]
        airline_iata: Option<String>,
        /// Status filter: scheduled, active, landed, cancelled
        #[arg(long, value_name = "STATUS")]
        flight_status: Option<String>,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Current weather for one or more cities
    Weather {
        /// City names, e.g. "Vancouver" "Zurich"
        #[arg(required = true, value_name = "CITY")]
        cities: Vec<String>,
    },

    /// List airports
    Airports {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List airlines
    Airlines {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List registered airframes
    Fleet {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Live aircraft queries
    #[command(subcommand)]
    Aircraft(AircraftCommand),

    /// Cache introspection and maintenance
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
pub enum AircraftCommand {
    /// Live aircraft positions, worldwide or inside a bounding box
    ///
    /// Pass all four corners to restrict the query; a partial box is
    /// rejected.
    Live {
        /// Minimum latitude in decimal degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lamin: Option<f64>,
        /// Minimum longitude in decimal degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lomin: Option<f64>,
        /// Maximum latitude in decimal degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lamax: Option<f64>,
        /// Maximum longitude in decimal degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lomax: Option<f64>,
    },
    /// Metadata for one aircraft by ICAO 24-bit address
    Icao {
        /// Transponder address in lowercase hex, e.g. 4b1805
        #[arg(value_name = "ICAO24")]
        icao24: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached entries with their age and expiry status
    Info,
    /// Remove every cached entry
    Clear,
}
