//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::ingest::{IngestService, SourceFetcher};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    fetcher: Arc<dyn SourceFetcher>,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                fetcher,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Ingest service over the shared fetcher and pool
    pub fn ingest_service(&self) -> IngestService<Arc<dyn SourceFetcher>> {
        IngestService::new(
            Arc::clone(&self.inner.fetcher),
            self.inner.db.clone(),
            self.inner.config.source.clone(),
        )
    }
}
