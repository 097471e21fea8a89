//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `CATALOG_API_URL` - Base URL of the catalog REST API
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CONTENT_DIR` - Locale files and design tokens (default: crates/storefront/content)
//! - `STOREFRONT_DEFAULT_LOCALE` - Fallback locale: es, en or fr (default: es)
//! - `CATALOG_REFRESH_SECS` - Catalog refresh interval (default: 300)
//! - `CATALOG_CACHE_TTL_SECS` - Catalog API response cache TTL (default: 60)
//! - `PRODUCTS_PAGE_SIZE` - Page size of the products view (default: 12)
//! - `HANDMADE_PAGE_SIZE` - Page size of the handmade view (default: 6)
//! - `BUILDS_PAGE_SIZE` - Page size of the builds view (default: 6)
//! - `WHATSAPP_PHONE` - Shop phone number for checkout links (international format, digits only)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.1)

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cyborgtech_core::{Collection, Locale};
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog REST API configuration
    pub catalog: CatalogConfig,
    /// Directory holding `i18n/<code>.json` and `design-system.json`
    pub content_dir: PathBuf,
    /// Locale used when a translation or preference is missing
    pub default_locale: Locale,
    /// Page sizes of the catalog views
    pub page_sizes: PageSizes,
    /// Shop phone number for WhatsApp checkout links
    pub whatsapp_phone: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Catalog REST API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API (e.g. `https://api.cyborgtech.shop`)
    pub api_url: Url,
    /// How often the catalog snapshot is refreshed
    pub refresh_interval: Duration,
    /// How long API responses stay cached
    pub cache_ttl: Duration,
}

/// Page sizes per catalog collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub products: usize,
    pub handmade: usize,
    pub builds: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            products: 12,
            handmade: 6,
            builds: 6,
        }
    }
}

impl PageSizes {
    /// Page size of `collection`.
    #[must_use]
    pub const fn for_collection(&self, collection: Collection) -> usize {
        match collection {
            Collection::Products => self.products,
            Collection::Handmade => self.handmade,
            Collection::Builds => self.builds,
        }
    }
}

impl StorefrontConfig {
    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn with_defaults(base_url: impl Into<String>, catalog_api_url: Url) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: base_url.into(),
            catalog: CatalogConfig {
                api_url: catalog_api_url,
                refresh_interval: Duration::from_secs(300),
                cache_ttl: Duration::from_secs(60),
            },
            content_dir: PathBuf::from("crates/storefront/content"),
            default_locale: Locale::Es,
            page_sizes: PageSizes::default(),
            whatsapp_phone: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

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

        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let catalog_api_url = Url::parse(&get_required_env("CATALOG_API_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e.to_string()))?;

        let mut config = Self::with_defaults(base_url, catalog_api_url);

        config.host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        config.port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        config.content_dir =
            PathBuf::from(get_env_or_default("STOREFRONT_CONTENT_DIR", "crates/storefront/content"));
        config.default_locale = parse_env_or_default("STOREFRONT_DEFAULT_LOCALE", "es")?;

        config.catalog.refresh_interval = get_refresh_interval("CATALOG_REFRESH_SECS", "300")?;
        config.catalog.cache_ttl =
            Duration::from_secs(parse_env_or_default("CATALOG_CACHE_TTL_SECS", "60")?);

        config.page_sizes = PageSizes {
            products: get_page_size("PRODUCTS_PAGE_SIZE", "12")?,
            handmade: get_page_size("HANDMADE_PAGE_SIZE", "6")?,
            builds: get_page_size("BUILDS_PAGE_SIZE", "6")?,
        };

        config.whatsapp_phone = get_optional_env("WHATSAPP_PHONE");
        config.sentry_dsn = get_optional_env("SENTRY_DSN");
        config.sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        config.sentry_sample_rate = parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?;
        config.sentry_traces_sample_rate = parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")?;

        Ok(config)
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Page sizes must be at least 1.
fn get_page_size(key: &str, default: &str) -> Result<usize, ConfigError> {
    let size: usize = parse_env_or_default(key, default)?;
    if size == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "page size must be at least 1".to_string(),
        ));
    }
    Ok(size)
}

/// The refresh interval must be at least one second.
fn get_refresh_interval(key: &str, default: &str) -> Result<Duration, ConfigError> {
    refresh_interval(key, parse_env_or_default(key, default)?)
}

fn refresh_interval(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "refresh interval must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig::with_defaults(
            "http://localhost:3000",
            Url::parse("http://localhost:3001").unwrap(),
        )
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.default_locale, Locale::Es);
        assert_eq!(config.page_sizes.for_collection(Collection::Products), 12);
        assert_eq!(config.page_sizes.for_collection(Collection::Handmade), 6);
        assert_eq!(config.catalog.refresh_interval, Duration::from_secs(300));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_parse_value_locale() {
        assert_eq!(parse_value::<Locale>("L", "en-GB").unwrap(), Locale::En);
        assert!(parse_value::<Locale>("L", "de").is_err());
    }

    #[test]
    fn test_parse_value_trims() {
        assert_eq!(parse_value::<u64>("K", " 42 ").unwrap(), 42);
    }

    #[test]
    fn test_zero_refresh_interval_is_rejected() {
        let err = refresh_interval("CATALOG_REFRESH_SECS", 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CATALOG_REFRESH_SECS"));
        assert_eq!(
            refresh_interval("CATALOG_REFRESH_SECS", 30).unwrap(),
            Duration::from_secs(30)
        );
    }
}
