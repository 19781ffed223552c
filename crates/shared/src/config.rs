//! Layered application configuration.
//!
//! Settings come from `config/default.toml`, then an optional
//! `config/<RUN_MODE>.toml` overlay, then `REBAR__`-prefixed environment
//! variables (double underscore separates nesting, e.g.
//! `REBAR__DATABASE__URL`).

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database pool settings.
    pub database: DatabaseConfig,
    /// Token signing settings.
    pub jwt: JwtConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database pool settings. The URL has no default; everything else does.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open when idle.
    #[serde(default = "DatabaseConfig::default_min_connections")]
    pub min_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        10
    }

    fn default_min_connections() -> u32 {
        1
    }
}

/// Token signing settings. The secret has no default; lifetimes do.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "JwtConfig::default_access_minutes")]
    pub access_token_expires_minutes: i64,
    /// Refresh token lifetime in days.
    #[serde(default = "JwtConfig::default_refresh_days")]
    pub refresh_token_expires_days: i64,
}

impl JwtConfig {
    fn default_access_minutes() -> i64 {
        15
    }

    fn default_refresh_days() -> i64 {
        7
    }
}

impl AppConfig {
    /// Loads and merges configuration from files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails to parse or a required value
    /// (database URL, JWT secret) is missing from every source.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REBAR").separator("__"))
            .build()?
            .try_deserialize()
    }
}
