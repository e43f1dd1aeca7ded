use std::sync::Arc;

use anyhow::Context;
use mongodb::Client as MongoClient;

use crate::config::Config;

pub mod file_store;
pub mod game_kinds;
pub mod game_service;
pub mod math;
pub mod store;

use file_store::{FileStore, InMemoryFileStore, ObjectStorageClient};
use store::{GameStore, InMemoryGameStore, MongoGameStore};

pub struct AppState {
    pub config: Config,
    pub games: Arc<dyn GameStore>,
    pub files: Arc<dyn FileStore>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let games: Arc<dyn GameStore> = if config.mongo_uri.is_empty() {
            tracing::warn!("MONGO_URI not configured, using in-memory game store (dev only)");
            Arc::new(InMemoryGameStore::new())
        } else {
            let mongo_client = MongoClient::with_uri_str(&config.mongo_uri)
                .await
                .context("Failed to connect to MongoDB")?;
            let store = MongoGameStore::new(mongo_client.database(&config.mongo_database));

            tokio::time::timeout(std::time::Duration::from_secs(5), store.ping())
                .await
                .map_err(|_| anyhow::anyhow!("MongoDB ping timeout after 5s"))??;
            tracing::info!("MongoDB connection established");

            Arc::new(store)
        };

        let files: Arc<dyn FileStore> = match config.object_storage.clone() {
            Some(settings) => Arc::new(ObjectStorageClient::new(settings)?),
            None => {
                tracing::warn!("Object storage not configured, thumbnails kept in memory");
                Arc::new(InMemoryFileStore::new())
            }
        };

        Ok(Self {
            config,
            games,
            files,
        })
    }

    /// Builds a state over explicit collaborators; used by tests and local
    /// tooling.
    pub fn with_stores(
        config: Config,
        games: Arc<dyn GameStore>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            config,
            games,
            files,
        }
    }
}
