use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use laborgrid::config::{Config, ConfigLoader, DEFAULT_BASE_URL};
use laborgrid::domain::Dataset;
use laborgrid::error::GridError;

#[test]
fn resolve_reads_explicit_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("laborgrid.json");
    fs::write(
        &path,
        r#"{
            "base_url": "http://stats.internal:4000/",
            "dataset": "unemp",
            "timeout_secs": 5,
            "suggest_timeout_ms": 1500,
            "preview_limit": 25,
            "download_dir": "/tmp/exports"
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.base_url, "http://stats.internal:4000/");
    assert_eq!(resolved.dataset, Dataset::Unemp);
    assert_eq!(resolved.http_timeout, Duration::from_secs(5));
    assert_eq!(resolved.suggest_timeout, Duration::from_millis(1500));
    assert_eq!(resolved.debounce, Duration::from_millis(500));
    assert_eq!(resolved.preview_limit, 25);
    assert_eq!(resolved.download_dir, Utf8PathBuf::from("/tmp/exports"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, GridError::ConfigRead(missing) if missing == path);
}

#[test]
fn unknown_fields_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("laborgrid.json");
    fs::write(&path, r#"{ "base_url": "http://x", "proteins": [] }"#).unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, GridError::ConfigParse(_));
}

#[test]
fn zero_preview_limit_is_rejected() {
    let err = ConfigLoader::resolve_config(Config {
        preview_limit: Some(0),
        download_dir: Some("/tmp".to_string()),
        ..Config::default()
    })
    .unwrap_err();
    assert_matches!(err, GridError::ConfigParse(message) if message.contains("preview_limit"));
}

#[test]
fn default_base_url_points_at_local_server() {
    let resolved = ConfigLoader::resolve_config(Config {
        download_dir: Some("/tmp".to_string()),
        ..Config::default()
    })
    .unwrap();
    assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
    assert_eq!(DEFAULT_BASE_URL, "http://127.0.0.1:4000");
}
