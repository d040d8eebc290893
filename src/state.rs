use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{RatingsMaintainer, Reviews, Tours, Users};
use crate::error::Error;
use crate::seed;
use crate::store::{DocumentStore, MemoryStore};

/// Shared per-process state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tours: Tours,
    pub reviews: Reviews,
    pub users: Users,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        Self::with_store(config, store).await
    }

    pub async fn with_store(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, Error> {
        let ratings = Arc::new(RatingsMaintainer::new(store.clone()));
        let state = Self {
            config: Arc::new(config),
            tours: Tours::new(store.clone()),
            reviews: Reviews::new(store.clone(), ratings.clone()),
            users: Users::new(store.clone()),
            store,
        };

        if let Some(dir) = state.config.seed_dir.clone() {
            info!(dir = %dir.display(), "loading seed data");
            seed::load_dir(&dir, state.store.clone(), &ratings).await?;
        }

        Ok(state)
    }
}
