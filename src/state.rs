use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::db;
use crate::services::{CatalogCache, CatalogClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// SeaORM database connection
    pub db: DatabaseConnection,
    pub config: Config,
    /// PokeAPI client (shares one bounded lookup cache)
    pub catalog: CatalogClient,
}

impl AppState {
    /// Create a new AppState by connecting to the database and preparing the schema
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let db = db::connect(&config.database_url)
            .await
            .map_err(|e| AppStateError::Database(e.to_string()))?;

        db::create_schema(&db)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;

        let cache = Arc::new(CatalogCache::new(config.pokeapi_cache_capacity));
        let catalog = CatalogClient::new(
            &config.pokeapi_base_url,
            Duration::from_secs(config.pokeapi_timeout_secs),
            &config.pokeapi_locale,
            cache,
        )
        .map_err(|e| AppStateError::HttpClient(e.to_string()))?;

        Ok(Self {
            db,
            config,
            catalog,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Database connection error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
