//! skyhub - cached access to aviation and weather APIs
//!
//! The library behind the skyhub dashboard tooling. Upstream responses are
//! cached in a single JSON file with per-endpoint freshness windows, so
//! repeated queries stay inside free-tier rate limits; concurrent misses
//! for the same request coalesce into one upstream call.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
