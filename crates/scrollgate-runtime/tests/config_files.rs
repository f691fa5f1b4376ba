//! Integration tests: loading router configuration from disk.

use std::io::Write;

use scrollgate_runtime::{ConfigError, RouterConfig};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn load_validated_reads_toml() {
    let file = write_temp(
        ".toml",
        r#"
quiescence_timeout_ms = 120
send_gestures = true

[overscroll]
enabled = true
start_threshold = 30.0
complete_threshold = 50.0
"#,
    );
    let config = RouterConfig::load_validated(file.path()).expect("valid config");
    assert_eq!(config.quiescence_timeout_ms, 120);
    assert_eq!(config.overscroll.start_threshold, 30.0);
    assert_eq!(config.overscroll.complete_threshold, 50.0);
}

#[test]
fn load_validated_reads_json_by_extension() {
    let file = write_temp(
        ".json",
        r#"{ "quiescence_timeout_ms": 80, "overscroll": { "enabled": false } }"#,
    );
    let config = RouterConfig::load_validated(file.path()).expect("valid config");
    assert_eq!(config.quiescence_timeout_ms, 80);
    assert!(!config.overscroll.enabled);
    assert_eq!(config.overscroll.start_threshold, 50.0);
}

#[test]
fn load_validated_rejects_inverted_thresholds() {
    let file = write_temp(
        ".toml",
        "[overscroll]\nstart_threshold = 80.0\ncomplete_threshold = 40.0\n",
    );
    match RouterConfig::load_validated(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("complete_threshold")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = RouterConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn malformed_json_is_json_error() {
    let file = write_temp(".json", "{ not json");
    let err = RouterConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}
