//! Integration tests for configuration loading

use beacon_map::infra::Config;
use beacon_map::services::GroupingMode;
use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[input]
file = "ramble.jsonl"
service_uuid = "fd6f"
require_service_uuid = true
not_before = "2020-06-21"
order_by_identifier = false

[output]
file = "out/points.jsonl"

[jitter]
enabled = true
normalize_longitude = true

[colors]
grouping = "global"
alpha = 0.8

[label]
separator = " - "

[random]
seed = 1234
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.input_file(), "ramble.jsonl");
    assert!(config.require_service_uuid());
    assert_eq!(
        config.not_before(),
        Some(NaiveDate::from_ymd_opt(2020, 6, 21).unwrap().and_hms_opt(0, 0, 0).unwrap())
    );
    assert!(!config.order_by_identifier());
    assert_eq!(config.output_file(), "out/points.jsonl");
    assert!(config.jitter_enabled());
    assert!(config.normalize_longitude());
    assert_eq!(config.grouping_mode(), GroupingMode::Global);
    assert_eq!(config.color_alpha(), 0.8);
    assert_eq!(config.label_separator(), " - ");
    assert_eq!(config.seed(), Some(1234));
    assert_eq!(config.config_file(), temp_file.path().display().to_string());
}

#[test]
fn test_partial_config_uses_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[jitter]\nenabled = true\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert!(config.jitter_enabled());
    assert_eq!(config.input_file(), "sightings.jsonl");
    assert_eq!(config.output_file(), "export.jsonl");
    assert_eq!(config.grouping_mode(), GroupingMode::Adjacency);
}

#[test]
fn test_invalid_not_before_is_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[input]\nnot_before = \"last tuesday\"\n").unwrap();
    temp_file.flush().unwrap();

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("last tuesday"));
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.input_file(), "sightings.jsonl");
    assert_eq!(config.output_file(), "export.jsonl");
    assert_eq!(config.config_file(), "default");
}
