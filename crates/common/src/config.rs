//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Image upload configuration.
    pub upload: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds. Expiry forces re-login; there is no
    /// refresh flow.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

/// Image upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Upload endpoint of the external image host.
    pub endpoint: String,
    /// API key for the image host.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Folder namespace on the image host.
    #[serde(default = "default_upload_folder")]
    pub folder: String,
    /// Bound on the upload request, in seconds.
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_ttl() -> u64 {
    86_400
}

fn default_upload_folder() -> String {
    "foodiediary".to_string()
}

const fn default_upload_timeout() -> u64 {
    30
}

const fn default_max_upload_bytes() -> usize {
    5_000_000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `FOODIE_ENV`)
    /// 3. Environment variables with `FOODIE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // Pick up a local .env before reading the environment.
        let _ = dotenvy::dotenv();

        let env = std::env::var("FOODIE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOODIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOODIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
