//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `COURSEHUB_API_BASE_URL`: Backend base URL (required)
//! - `COURSEHUB_API_RETRIES`: Retries after a transport failure
//! - `COURSEHUB_API_RETRY_DELAY_MS`: Base retry delay in milliseconds
//! - `COURSEHUB_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `COURSEHUB_STORAGE_PATH`: Path of the persisted storage file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./coursehub.json` or `./coursehub.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use coursehub_domain::{ClientConfig, CourseHubError, Result, RetryConfig, StorageConfig};

pub const BASE_URL_ENV: &str = "COURSEHUB_API_BASE_URL";
pub const RETRIES_ENV: &str = "COURSEHUB_API_RETRIES";
pub const RETRY_DELAY_ENV: &str = "COURSEHUB_API_RETRY_DELAY_MS";
pub const TIMEOUT_ENV: &str = "COURSEHUB_API_TIMEOUT_SECS";
pub const STORAGE_PATH_ENV: &str = "COURSEHUB_STORAGE_PATH";

/// Load configuration with automatic fallback strategy
///
/// The environment wins whenever the base URL is set there; a config file is
/// only probed when it is absent.
///
/// # Errors
/// Returns `CourseHubError::Config` if no source provides a base URL or a
/// value is malformed.
pub fn load() -> Result<ClientConfig> {
    if let Err(e) = env_var(BASE_URL_ENV) {
        tracing::debug!(error = %e, "Base URL not in environment, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only the base URL is required; everything else falls back to defaults.
///
/// # Errors
/// Returns `CourseHubError::Config` if the base URL is missing or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let base_url = env_var(BASE_URL_ENV)?;
    let defaults = RetryConfig::default();
    let mut config = ClientConfig::new(base_url);

    config.retry = RetryConfig {
        retries: env_parse(RETRIES_ENV)?.unwrap_or(defaults.retries),
        retry_delay_ms: env_parse(RETRY_DELAY_ENV)?.unwrap_or(defaults.retry_delay_ms),
    };
    if let Some(timeout) = env_parse(TIMEOUT_ENV)? {
        config.timeout_secs = timeout;
    }
    if let Some(path) = std::env::var_os(STORAGE_PATH_ENV) {
        config.storage = StorageConfig { path: PathBuf::from(path) };
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `CourseHubError::Config` if the file is missing, malformed, or
/// has no usable base URL.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CourseHubError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CourseHubError::Config(format!(
                "{BASE_URL_ENV} is not set and no config file was found"
            ))
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CourseHubError::Config(format!("Failed to read config file: {e}")))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content, by file extension
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CourseHubError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CourseHubError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CourseHubError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// The client cannot start against an empty or unparsable base URL.
fn validate(mut config: ClientConfig) -> Result<ClientConfig> {
    let trimmed = config.base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CourseHubError::Config("API base URL is empty".to_string()));
    }
    url::Url::parse(trimmed)
        .map_err(|e| CourseHubError::Config(format!("Invalid API base URL {trimmed:?}: {e}")))?;

    config.base_url = trimmed.to_string();
    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.extend(candidate_files(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> Vec<PathBuf> {
    ["config.json", "config.toml", "coursehub.json", "coursehub.toml"]
        .iter()
        .map(|name| dir.join(name))
        .collect()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CourseHubError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CourseHubError::Config(format!("Invalid value for {key}: {e}"))),
        _ => Ok(None),
    }
}
