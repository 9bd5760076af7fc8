//! Channel metadata repository and the engine-facing store adapter.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{Database, DbError};
use crate::error::HostError;
use crate::host::MetadataStore;

/// Key/value metadata queries for channels.
pub struct MetadataRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MetadataRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a metadata value.
    pub async fn get(&self, channel: &str, key: &str) -> Result<Option<String>, DbError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM channel_metadata WHERE channel = ? AND key = ?",
        )
        .bind(channel)
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(value)
    }

    /// Set a metadata key, replacing any existing value.
    pub async fn set(&self, channel: &str, key: &str, value: &str) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO channel_metadata (channel, key, value)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(channel)
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a metadata key. No-op if absent.
    pub async fn delete(&self, channel: &str, key: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM channel_metadata WHERE channel = ? AND key = ?")
            .bind(channel)
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// [`MetadataStore`] backed by the bundled SQLite database.
#[derive(Clone)]
pub struct SqliteMetadataStore {
    db: Database,
}

impl SqliteMetadataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the store at the path configured in
    /// [`EngineConfig`](crate::config::EngineConfig).
    pub async fn open(config: &crate::config::EngineConfig) -> Result<Self, DbError> {
        Ok(Self::new(Database::new(&config.database).await?))
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn get(&self, channel: &str, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.db.metadata().get(channel, key).await?)
    }

    async fn set(&self, channel: &str, key: &str, value: &str) -> Result<(), HostError> {
        Ok(self.db.metadata().set(channel, key, value).await?)
    }

    async fn delete(&self, channel: &str, key: &str) -> Result<(), HostError> {
        Ok(self.db.metadata().delete(channel, key).await?)
    }
}
