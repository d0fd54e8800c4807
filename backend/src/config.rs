//! Application configuration.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the API server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path, optionally prefixed with `sqlite:`. `:memory:` is accepted.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// `*` or a comma-separated list of allowed origins.
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

impl CorsConfig {
    /// Explicit origins, or `None` when any origin is allowed.
    pub fn origin_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_database_url() -> String {
    "sqlite:./data/ticketdesk.db".to_string()
}
fn default_token_ttl_hours() -> i64 {
    24
}
fn default_bcrypt_cost() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cors_origins() -> String {
    "*".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (TICKETDESK__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port() as i64)?
            .set_default("database.url", default_database_url())?
            .set_default("auth.token_ttl_hours", default_token_ttl_hours())?
            .set_default("auth.bcrypt_cost", default_bcrypt_cost() as i64)?
            .set_default("logging.level", default_log_level())?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("TICKETDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
