use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::http::{ApiConfig, HttpRepository};
use crate::repository::{ProgressRepository, SessionRecordRepository, Storage};

mod kv_repo;
mod migrate;

/// Local key/value persistence in a `SQLite` file.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or a
    /// connection pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Remote repositories over HTTP, local persistence in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn connect(api: ApiConfig, database_url: &str) -> Result<Self, SqliteInitError> {
        let local = SqliteRepository::connect(database_url).await?;
        local.migrate().await?;
        let remote = HttpRepository::new(api);
        tracing::debug!(base_url = %remote.config().base_url(), "storage connected");

        let progress: Arc<dyn ProgressRepository> = Arc::new(local.clone());
        let session_record: Arc<dyn SessionRecordRepository> = Arc::new(local);
        Ok(Self {
            match_sets: Arc::new(remote.clone()),
            schools: Arc::new(remote.clone()),
            sales: Arc::new(remote.clone()),
            users: Arc::new(remote.clone()),
            blogs: Arc::new(remote.clone()),
            results: Arc::new(remote.clone()),
            exams: Arc::new(remote.clone()),
            tasks: Arc::new(remote.clone()),
            auth: Arc::new(remote),
            progress,
            session_record,
        })
    }
}
