//! Configuration tests
//!
//! `to_toml()` is the config file template, so it must parse back through
//! `FileConfig` into the same configuration.

use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).expect("config should parse")
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );

    let reloaded = Config::from_layers(parsed.unwrap(), no_env).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_config_roundtrip_custom_values() {
    let mut config = Config::default();
    config.proofs = "https://example.com/runs/\"quoted\"".to_string();
    config.bind_addr = "0.0.0.0:9000".parse().unwrap();
    config.index = IndexStrategy::Manifest;
    config.manifest_name = "proofs.json".to_string();
    config.request_timeout_secs = 5;
    config.copied_feedback_ms = 500;
    config.logging.level = "debug".to_string();
    config.logging.file_enabled = true;
    config.logging.file_dir = PathBuf::from(r"C:\logs\proofview");
    config.logging.file_rotation = LogRotation::Hourly;

    let reloaded = Config::from_layers(parse(&config.to_toml()), no_env).unwrap();
    assert_eq!(reloaded, config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Layering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::from_layers(FileConfig::default(), no_env).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.proofs, "./proofs");
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
    assert_eq!(config.copied_feedback_ms, 2000);
}

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
proofs = "/from/file"
bind_addr = "127.0.0.1:1111"
"#,
    );
    let env: HashMap<&str, &str> = [("PROOFVIEW_PROOFS", "/from/env")].into_iter().collect();

    let config = Config::from_layers(file, |key| env.get(key).map(|v| v.to_string())).unwrap();
    assert_eq!(config.proofs, "/from/env");
    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:1111");
}

#[test]
fn test_invalid_bind_address_is_an_error() {
    let file = parse(r#"bind_addr = "not-an-address""#);
    let err = Config::from_layers(file, no_env).unwrap_err();
    assert!(err.to_string().contains("Invalid bind address"));
}

#[test]
fn test_unknown_enum_values_fall_back() {
    let file = parse(
        r#"
index = "sitemap"
[logging]
file_rotation = "weekly"
"#,
    );
    let config = Config::from_layers(file, no_env).unwrap();
    assert_eq!(config.index, IndexStrategy::Listing);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_wrong_type_is_a_parse_error() {
    let parsed: Result<FileConfig, _> = toml::from_str(r#"request_timeout_secs = "thirty""#);
    assert!(parsed.is_err());
}
