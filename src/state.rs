// src/state.rs
use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::services::db::DbStore;
use crate::services::tiingo::TiingoClient;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct AppState {
    pub config: AppConfig,
    pub db: DbStore,
    pub upstream: TiingoClient,
}

impl AppState {
    /// Builds the upstream client and opens (and if needed creates) the store.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = DbStore::new(config.db_path.clone()).await?;
        let upstream = TiingoClient::new(&config).context("Failed to build HTTP client")?;
        Ok(AppState { config, db, upstream })
    }
}
