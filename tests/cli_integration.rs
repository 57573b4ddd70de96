//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use uplink_dedupe::cli::{parse_args_from, Args};
use uplink_dedupe::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("uplink-dedupe")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.dedupe_ms.is_none());
    assert!(result.collect_ms.is_none());
    assert!(result.config.is_none());
    assert!(result.log_level.is_none());
    assert!(!result.json);
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-d",
        "2000",
        "-w",
        "5000",
        "-l",
        "debug",
        "--json",
    ]))
    .unwrap();

    assert_eq!(result.dedupe_ms, Some(2000));
    assert_eq!(result.collect_ms, Some(5000));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert!(result.json);
}

#[test]
fn test_cli_invalid_window() {
    assert!(parse_args_from(args(&["-w", "-5"])).is_err());
    assert!(parse_args_from(args(&["--dedupe-ms", "fast"])).is_err());
}

#[test]
fn test_cli_unknown_flag() {
    assert!(parse_args_from(args(&["--port", "80"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let file = config_file(
        r#"{
        "windows": {
            "dedupe_ms": 2000,
            "collect_ms": 5000
        },
        "logging": {
            "level": "debug"
        }
    }"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.windows.dedupe_ms, 2000);
    assert_eq!(config.windows.collect_ms, 5000);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_priority_cli_over_file() {
    let file = config_file(r#"{ "windows": { "dedupe_ms": 1000, "collect_ms": 3000 } }"#);

    let args = Args {
        dedupe_ms: Some(250),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    // CLI value wins, file value kept where CLI is silent
    assert_eq!(config.windows.dedupe_ms, 250);
    assert_eq!(config.windows.collect_ms, 3000);
}

#[test]
fn test_config_missing_file() {
    let args = Args {
        config: Some("/nonexistent/uplink-dedupe.json".into()),
        ..Args::default()
    };

    let err = Config::load(&args).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_config_to_window_config() {
    let args = Args {
        dedupe_ms: Some(2000),
        collect_ms: Some(5000),
        ..Args::default()
    };

    let windows = Config::load(&args).unwrap().to_window_config().unwrap();

    assert_eq!(windows.dedupe, Duration::from_secs(2));
    assert_eq!(windows.collect, Duration::from_secs(5));
}

#[test]
fn test_config_rejects_dedupe_after_collect() {
    let args = Args {
        dedupe_ms: Some(6000),
        collect_ms: Some(5000),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    assert!(config.to_window_config().is_err());
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_partial_deserialization() {
    let config: Config = serde_json::from_str(r#"{"windows": {"dedupe_ms": 50}}"#).unwrap();

    assert_eq!(config.windows.dedupe_ms, 50);
    assert_eq!(config.windows.collect_ms, 5000); // Default
    assert_eq!(config.logging.level, "info"); // Default
}
