use std::env;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct Config {
    // Application
    pub app_name: String,
    pub app_version: String,

    // Database
    pub database_url: String,

    // JWT
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,

    // Server
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,

    // Catalog (PokeAPI)
    pub pokeapi_base_url: String,
    pub pokeapi_timeout_secs: u64,
    pub pokeapi_cache_capacity: usize,
    pub pokeapi_locale: String,

    // Logging
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "pokedex-api".to_string()),
            app_version: env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://pokedex.db?mode=rwc".to_string()),

            jwt_secret: env::var("SECRET_KEY").map_err(|_| ConfigError::Missing("SECRET_KEY"))?,
            jwt_algorithm: Algorithm::from_str(
                &env::var("ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            )
            .map_err(|_| ConfigError::Invalid("ALGORITHM"))?,
            access_token_expire_minutes: parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,

            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8000)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:3000".to_string(),
                        "http://localhost:5173".to_string(),
                    ]
                }),
            rate_limit_enabled: parse_var("RATE_LIMIT_ENABLED", true)?,

            pokeapi_base_url: env::var("POKEAPI_BASE_URL")
                .unwrap_or_else(|_| "https://pokeapi.co/api/v2".to_string()),
            pokeapi_timeout_secs: parse_var("POKEAPI_TIMEOUT_SECS", 10)?,
            pokeapi_cache_capacity: parse_var("POKEAPI_CACHE_CAPACITY", 1024)?,
            pokeapi_locale: env::var("POKEAPI_LOCALE").unwrap_or_else(|_| "es".to_string()),

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}
