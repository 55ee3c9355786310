use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::{config, database};

/// Composition root of the admin core: the loaded configuration and
/// the store session behind both operations.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Admin>,
    pub db: database::Pool,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    #[tracing::instrument]
    pub async fn new(cfg: config::Admin) -> Result<Self, AppError> {
        let db = database::Pool::new(&cfg.db, &cfg.db.primary)
            .await
            .change_context(AppError)?;

        let app = Self {
            config: Arc::new(cfg),
            db,
        };

        Ok(app)
    }
}

impl App {
    /// Acquires a connection for mutating operations.
    #[tracing::instrument(skip_all)]
    pub async fn db_write(&self) -> Result<database::PoolConnection, database::Error> {
        Ok(self.db.get().await?)
    }

    /// Acquires a connection for read-only snapshots.
    #[tracing::instrument(skip_all)]
    pub async fn db_read(&self) -> Result<database::PoolConnection, database::Error> {
        Ok(self.db.get().await?)
    }

    /// Releases the store session. This runs on every shutdown path,
    /// normal exit and forced close alike; dropped transactions have
    /// already been rolled back by then.
    #[tracing::instrument(skip_all)]
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
