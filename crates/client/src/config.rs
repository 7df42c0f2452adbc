//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `IWB_API_BASE_URL` - Backend origin (default: `http://localhost:5000`)
//! - `IWB_API_TOKEN` - Bearer token sent with every request
//! - `IWB_DATA_DIR` - Directory holding the local draft store (default: `.iwb`)
//! - `IWB_QUERIES_PER_PAGE` - Query history page size (default: 5)
//! - `IWB_QUERY_TIMEOUT_SECS` - Timeout for query submission (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_DATA_DIR: &str = ".iwb";
const DEFAULT_QUERIES_PER_PAGE: &str = "5";

/// Timeout for query submission when none is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Directory for the file-backed draft store
    pub data_dir: PathBuf,
    /// Number of queries per history page
    pub queries_per_page: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
///
/// `SecretString` redacts the token in `Debug` output.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin; always ends with `/` so endpoints join beneath it
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Timeout applied to query submission
    pub query_timeout: Duration,
}

impl ApiConfig {
    /// Configuration for a backend at `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("IWB_API_BASE_URL", base_url)?,
            token: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "IWB_API_BASE_URL",
            &get_or("IWB_API_BASE_URL", DEFAULT_BASE_URL),
        )?;
        let token = lookup("IWB_API_TOKEN")
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        let query_timeout = lookup("IWB_QUERY_TIMEOUT_SECS")
            .map(|v| parse_positive("IWB_QUERY_TIMEOUT_SECS", &v))
            .transpose()?
            .map_or(DEFAULT_QUERY_TIMEOUT, Duration::from_secs);
        let queries_per_page = u32::try_from(parse_positive(
            "IWB_QUERIES_PER_PAGE",
            &get_or("IWB_QUERIES_PER_PAGE", DEFAULT_QUERIES_PER_PAGE),
        )?)
        .map_err(|e| ConfigError::InvalidEnvVar("IWB_QUERIES_PER_PAGE".to_string(), e.to_string()))?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                query_timeout,
            },
            data_dir: PathBuf::from(get_or("IWB_DATA_DIR", DEFAULT_DATA_DIR)),
            queries_per_page,
            sentry_dsn: lookup("SENTRY_DSN").filter(|d| !d.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an absolute http(s) URL and make sure its path ends with `/`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parse an integer that must be at least 1.
fn parse_positive(key: &str, value: &str) -> Result<u64, ConfigError> {
    let n = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if n == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(n)
}
