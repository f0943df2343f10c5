//! Configuration management for the turf booking server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TURF_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bearer token verification
    pub identity: IdentityConfig,

    /// Media host used for images and payment proofs
    pub media: MediaConfig,

    /// Listing search limits
    pub listing: ListingConfig,

    /// Booking workflow limits
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which store implementation backs the service
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// Shared HS256 secret; used when no public key is configured
    #[serde(default)]
    pub secret: String,

    /// RS256 public key in PEM form
    #[serde(default)]
    pub public_key_pem: Option<String>,

    #[serde(default)]
    pub issuer: Option<String>,

    #[serde(default)]
    pub audience: Option<String>,

    /// Clock skew tolerated on `exp`, in seconds
    pub leeway_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Upload endpoint base, e.g. https://api.cloudinary.com/v1_1
    pub base_url: String,

    #[serde(default)]
    pub cloud_name: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub api_secret: String,

    pub timeout_secs: u64,

    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,

    /// Days covered by an availability read without an explicit range
    pub availability_window_days: u32,

    /// Longest range an availability read may ask for
    pub max_availability_range_days: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("TURF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("identity.leeway_secs", 30)?
            .set_default("media.base_url", "https://api.cloudinary.com/v1_1")?
            .set_default("media.timeout_secs", 20)?
            .set_default("media.max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("listing.default_page_size", 12)?
            .set_default("listing.max_page_size", 50)?
            .set_default("booking.default_page_size", 10)?
            .set_default("booking.max_page_size", 50)?
            .set_default("booking.availability_window_days", 7)?
            .set_default("booking.max_availability_range_days", 62)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TURF_ prefix)
            .add_source(
                Environment::with_prefix("TURF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration suitable for tests and local runs without Postgres
    pub fn for_memory_store(identity_secret: impl Into<String>) -> Self {
        Self {
            environment: "test".into(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout_secs: 1,
            },
            identity: IdentityConfig {
                secret: identity_secret.into(),
                public_key_pem: None,
                issuer: None,
                audience: None,
                leeway_secs: 0,
            },
            media: MediaConfig {
                base_url: "http://127.0.0.1:9".into(),
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                timeout_secs: 1,
                max_upload_bytes: shared::MAX_IMAGE_BYTES,
            },
            listing: ListingConfig {
                default_page_size: 12,
                max_page_size: 50,
            },
            booking: BookingConfig {
                default_page_size: 10,
                max_page_size: 50,
                availability_window_days: 7,
                max_availability_range_days: 62,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
