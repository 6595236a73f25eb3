//! skyhub - fetch aviation dashboard data through a persistent cache
//!
//! Each subcommand maps onto one library call and prints the JSON result
//! to stdout. Cached responses are served without touching the network;
//! logs go to stderr under `RUST_LOG` control.

use clap::Parser;
use futures::future::join_all;
use serde_json::{json, Value};
use skyhub::api::{ApiClient, BoundingBox, FlightQuery};
use skyhub::cache::{CacheManager, CacheStore};
use skyhub::cli::{AircraftCommand, CacheCommand, Cli, Command};
use skyhub::config::ApiConfig;

#[tokio::main]
async fn main() {
    // API keys usually live in a local .env during development
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &cli.cache_file {
        Some(path) => CacheStore::with_file(path.clone()),
        None => CacheStore::new()
            .ok_or("could not determine a cache directory; pass --cache-file")?,
    };
    let cache = CacheManager::new(store);
    let client = ApiClient::new(ApiConfig::from_env(), cache.clone());

    match cli.command {
        Command::Flights {
            flight_iata,
            dep_iata,
            arr_iata,
            airline_iata,
            flight_status,
            limit,
        } => {
            let query = FlightQuery {
                flight_iata,
                dep_iata,
                arr_iata,
                airline_iata,
                flight_status,
                limit,
            };
            print_json(&client.flights(&query).await?);
        }
        Command::Weather { cities } => {
            let results = join_all(cities.iter().map(|city| client.city_weather(city))).await;
            let mut report = serde_json::Map::new();
            for (city, result) in cities.into_iter().zip(results) {
                let value = match result {
                    Ok(payload) => payload,
                    Err(e) => json!({ "error": e.to_string() }),
                };
                report.insert(city, value);
            }
            print_json(&Value::Object(report));
        }
        Command::Airports { limit } => print_json(&client.airports(limit).await?),
        Command::Airlines { limit } => print_json(&client.airlines(limit).await?),
        Command::Fleet { limit } => print_json(&client.airplanes(limit).await?),
        Command::Aircraft(AircraftCommand::Live {
            lamin,
            lomin,
            lamax,
            lomax,
        }) => {
            let no_box =
                lamin.is_none() && lomin.is_none() && lamax.is_none() && lomax.is_none();
            let live = if no_box {
                client.live_aircraft().await?
            } else {
                let bbox = BoundingBox {
                    lamin,
                    lomin,
                    lamax,
                    lomax,
                };
                client.live_aircraft_in_box(&bbox).await?
            };
            print_json(&serde_json::to_value(&live)?);
        }
        Command::Aircraft(AircraftCommand::Icao { icao24 }) => {
            print_json(&client.aircraft_by_icao(&icao24).await?);
        }
        Command::Cache(CacheCommand::Info) => {
            let report = json!({
                "cache_file": cache.file().display().to_string(),
                "total_entries": cache.len(),
                "entries": cache.info(),
                "session": client.stats(),
            });
            print_json(&report);
        }
        Command::Cache(CacheCommand::Clear) => {
            cache.clear()?;
            println!("Cache cleared");
        }
    }

    Ok(())
}

/// Pretty-prints a JSON value to stdout
fn print_json(value: &Value) {
    println!("{:#}", value);
}
