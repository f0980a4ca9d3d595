use crate::core::SearchSettings;
use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub google: GoogleSettings,
    pub yelp: YelpSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YelpSettings {
    #[serde(default = "default_yelp_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

fn default_google_endpoint() -> String { "https://maps.googleapis.com/maps/api".to_string() }
fn default_yelp_endpoint() -> String { "https://api.yelp.com/v3".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_geocode_capacity")]
    pub geocode_capacity: u64,
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            geocode_capacity: default_geocode_capacity(),
            geocode_ttl_secs: default_geocode_ttl(),
        }
    }
}

fn default_geocode_capacity() -> u64 { 10_000 }
fn default_geocode_ttl() -> u64 { 86_400 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with GRUBSYNC_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GRUBSYNC__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("GRUBSYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the well-known plain environment variables on top of the layered config
///
/// `DATABASE_URL`, `YELP_API_KEY` and `GOOGLE_MAPS_API_KEY` are the names the
/// deployment already exports, so they win over file values.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("database.url", env::var("DATABASE_URL").ok()),
        ("yelp.api_key", env::var("YELP_API_KEY").ok()),
        ("google.api_key", env::var("GOOGLE_MAPS_API_KEY").ok()),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, value) in overrides {
        if let Some(value) = value {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
