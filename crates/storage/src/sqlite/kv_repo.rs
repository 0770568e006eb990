use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{KeyValueStore, StorageError};

use super::SqliteRepository;

const UPSERT_VALUE: &str = r"
    INSERT INTO local_storage (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
    ";

fn connection_error(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(UPSERT_VALUE)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn remove_value(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn set_values(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection_error)?;
        let now = Utc::now();
        for (key, value) in pairs {
            sqlx::query(UPSERT_VALUE)
                .bind(*key)
                .bind(*value)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(connection_error)?;
        }
        tx.commit().await.map_err(connection_error)
    }

    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection_error)?;
        for key in keys {
            sqlx::query("DELETE FROM local_storage WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(connection_error)?;
        }
        tx.commit().await.map_err(connection_error)
    }
}
