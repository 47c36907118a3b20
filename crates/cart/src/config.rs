//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_BASE_URL` - Base URL of the catalog REST API (e.g., `http://localhost:3333`)
//!
//! ## Optional
//! - `CART_STORE_DIR` - Directory for the durable cart snapshot (default: `.rocketshoes`)
//! - `CART_SNAPSHOT_KEY` - Key the snapshot is stored under (default: `@RocketShoes:cart`)
//! - `CATALOG_TIMEOUT_SECS` - Per-request catalog timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Product display cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Storage key used for the cart snapshot unless overridden.
pub const DEFAULT_SNAPSHOT_KEY: &str = "@RocketShoes:cart";

const DEFAULT_STORE_DIR: &str = ".rocketshoes";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Directory holding the durable store files
    pub store_dir: PathBuf,
    /// Durable store key for the cart snapshot
    pub snapshot_key: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; `products` and `stock` routes are resolved against it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product displays stay cached
    pub cache_ttl: Duration,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog = CatalogConfig::from_env()?;
        let store_dir = PathBuf::from(get_env_or_default("CART_STORE_DIR", DEFAULT_STORE_DIR));
        let snapshot_key = get_env_or_default("CART_SNAPSHOT_KEY", DEFAULT_SNAPSHOT_KEY);
        if snapshot_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_SNAPSHOT_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            catalog,
            store_dir,
            snapshot_key,
            sentry_dsn,
        })
    }
}

impl CatalogConfig {
    /// Build a catalog configuration with default timeout and cache TTL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL cannot be parsed.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_required_env("CATALOG_BASE_URL")?)?;
        let timeout = get_secs("CATALOG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let cache_ttl = get_secs("CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            base_url,
            timeout,
            cache_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a whole number of seconds as a `Duration`.
fn get_secs(key: &str, default: &str) -> Result<Duration, ConfigError> {
    get_env_or_default(key, default)
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the catalog base URL, normalizing it to end with a slash.
///
/// `Url::join` replaces the last path segment unless the base ends with `/`,
/// so `http://host/api` would otherwise resolve `products` to `http://host/products`.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("CATALOG_BASE_URL".to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
