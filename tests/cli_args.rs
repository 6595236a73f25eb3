//! Integration tests for the skyhub binary
//!
//! Runs the compiled binary against temporary cache files. Commands that
//! would reach an upstream API are either served from a seeded cache or
//! pointed at an unroutable address, so no test depends on the network.

use chrono::{Duration, Utc};
use serde_json::json;
use skyhub::cache::{CacheEntry, CacheStore};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_skyhub"))
        .args(args)
        .output()
        .expect("Failed to execute skyhub")
}

/// Variant that also sets environment variables for the child
fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> std::process::Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_skyhub"));
    command.args(args);
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute skyhub")
}

/// Seeds a cache file with one entry of the given age
fn seed_cache(file: &Path, key: &str, payload: serde_json::Value, age: Duration) {
    let store = CacheStore::with_file(file.to_path_buf());
    store
        .write(
            key,
            CacheEntry {
                payload,
                stored_at: Utc::now() - age,
            },
        )
        .expect("Seeding the cache file should succeed");
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skyhub"), "Help should mention skyhub");
    assert!(stdout.contains("flights"), "Help should list the flights subcommand");
    assert!(stdout.contains("cache"), "Help should list the cache subcommand");
}

#[test]
fn test_missing_subcommand_prints_usage_and_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success(), "Expected no subcommand to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "Should print usage: {}", stderr);
}

#[test]
fn test_weather_requires_a_city() {
    let output = run_cli(&["weather"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required"),
        "Should complain about the missing city: {}",
        stderr
    );
}

#[test]
fn test_cache_info_on_empty_cache() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");

    let output = run_cli(&[
        "cache",
        "info",
        "--cache-file",
        cache_file.to_str().expect("Path should be UTF-8"),
    ]);

    assert!(output.status.success(), "cache info should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"total_entries\": 0"), "Got: {}", stdout);
    assert!(stdout.contains("api_cache.json"));
}

#[test]
fn test_cache_clear_writes_an_empty_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");
    seed_cache(&cache_file, "some_key", json!({"data": []}), Duration::hours(1));

    let output = run_cli(&[
        "cache",
        "clear",
        "--cache-file",
        cache_file.to_str().expect("Path should be UTF-8"),
    ]);

    assert!(output.status.success(), "cache clear should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cache cleared"));

    let content = std::fs::read_to_string(&cache_file).expect("Cache file should exist");
    assert_eq!(content, "{}");
}

#[test]
fn test_cache_info_reports_expired_entries() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");
    seed_cache(
        &cache_file,
        r#"aviationstack_airports_[("limit", "100")]"#,
        json!({"data": []}),
        Duration::hours(25),
    );

    let output = run_cli(&[
        "cache",
        "info",
        "--cache-file",
        cache_file.to_str().expect("Path should be UTF-8"),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aviationstack_airports"), "Got: {}", stdout);
    assert!(stdout.contains("\"expired\": true"), "Got: {}", stdout);
    assert!(stdout.contains("\"total_entries\": 1"));
}

#[test]
fn test_airports_served_from_seeded_cache() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");
    // The exact key the client builds for `airports` with the default limit
    seed_cache(
        &cache_file,
        r#"aviationstack_airports_[("limit", "100")]"#,
        json!({"data": [{"airport_name": "Vancouver International"}]}),
        Duration::minutes(5),
    );

    let output = run_cli(&[
        "airports",
        "--cache-file",
        cache_file.to_str().expect("Path should be UTF-8"),
    ]);

    assert!(
        output.status.success(),
        "A fresh cached entry should be served without network access: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Vancouver International"), "Got: {}", stdout);
}

#[test]
fn test_partial_bounding_box_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");

    let output = run_cli(&[
        "aircraft",
        "live",
        "--lamin",
        "45.8",
        "--cache-file",
        cache_file.to_str().expect("Path should be UTF-8"),
    ]);

    assert!(!output.status.success(), "A partial box should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing required parameters"),
        "Should name the validation failure: {}",
        stderr
    );
    assert!(stderr.contains("lomin"), "Should name a missing corner: {}", stderr);
}

#[test]
fn test_unreachable_upstream_reports_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache_file = temp_dir.path().join("api_cache.json");

    let output = run_cli_with_env(
        &[
            "aircraft",
            "live",
            "--cache-file",
            cache_file.to_str().expect("Path should be UTF-8"),
        ],
        &[("OPENSKY_BASE_URL", "http://127.0.0.1:1")],
    );

    assert!(!output.status.success(), "An unreachable upstream should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"), "Got: {}", stderr);
    assert!(stderr.contains("opensky"), "Should name the source: {}", stderr);
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["teleport"]);
    assert!(!output.status.success());
}
