use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::UserDirs;
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_PREVIEW_LIMIT;
use crate::domain::Dataset;
use crate::error::GridError;
use crate::suggest::{DEFAULT_QUIET_INTERVAL, DEFAULT_REQUEST_TIMEOUT};

pub const CONFIG_FILE: &str = "laborgrid.json";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub dataset: Option<Dataset>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    #[serde(default)]
    pub suggest_timeout_ms: Option<u64>,
    #[serde(default)]
    pub preview_limit: Option<usize>,
    #[serde(default)]
    pub download_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub dataset: Dataset,
    pub http_timeout: Duration,
    pub debounce: Duration,
    pub suggest_timeout: Duration,
    pub preview_limit: usize,
    pub download_dir: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `laborgrid.json` in the working directory when it
    /// exists. No file at the default location means all defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GridError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GridError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| GridError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GridError> {
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GridError::ConfigParse(format!(
                "base_url must be an http(s) URL: {base_url}"
            )));
        }

        let preview_limit = config.preview_limit.unwrap_or(DEFAULT_PREVIEW_LIMIT);
        if preview_limit == 0 {
            return Err(GridError::ConfigParse(
                "preview_limit must be at least 1".to_string(),
            ));
        }

        let download_dir = match config.download_dir {
            Some(dir) => Utf8PathBuf::from(dir),
            None => default_download_dir()?,
        };

        Ok(ResolvedConfig {
            base_url,
            dataset: config.dataset.unwrap_or(Dataset::Laus),
            http_timeout: Duration::from_secs(
                config.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            debounce: config
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_QUIET_INTERVAL),
            suggest_timeout: config
                .suggest_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            preview_limit,
            download_dir,
        })
    }
}

pub fn default_download_dir() -> Result<Utf8PathBuf, GridError> {
    let dirs = UserDirs::new();
    let dir = dirs
        .as_ref()
        .and_then(|dirs| dirs.download_dir().map(|dir| dir.to_path_buf()))
        .or_else(|| dirs.as_ref().map(|dirs| dirs.home_dir().join("Downloads")));
    match dir {
        Some(dir) => Utf8PathBuf::from_path_buf(dir)
            .map_err(|_| GridError::Filesystem("non-utf8 download directory".to_string())),
        None => std::env::current_dir()
            .map_err(|err| GridError::Filesystem(err.to_string()))
            .and_then(|cwd| {
                Utf8PathBuf::from_path_buf(cwd)
                    .map_err(|_| GridError::Filesystem("non-utf8 working directory".to_string()))
            }),
    }
}
