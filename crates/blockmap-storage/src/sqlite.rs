//! SQLite-backed [`EntityStore`].
//!
//! One `entities` table holds every record as JSON text under the composite
//! key `(entity, id)`; `save` is an upsert on that key, so replaying a block
//! rewrites its rows in place.
//!
//! ```rust,no_run
//! use blockmap_storage::sqlite::SqliteEntityStore;
//! use blockmap_core::EntityStore;
//!
//! # async fn example() -> Result<(), blockmap_core::IndexerError> {
//! let store = SqliteEntityStore::open("./entities.db").await?;
//! store.save("AvalancheBlock", "0xb1", serde_json::json!({ "number": 1 })).await?;
//! assert_eq!(store.count("AvalancheBlock").await?, 1);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use blockmap_core::{EntityStore, IndexerError};

const CREATE_ENTITIES: &str = "CREATE TABLE IF NOT EXISTS entities (
    entity TEXT NOT NULL,
    id     TEXT NOT NULL,
    data   TEXT NOT NULL,
    PRIMARY KEY (entity, id)
)";

/// Entity records in a SQLite database file (or an in-memory database).
pub struct SqliteEntityStore {
    pool: SqlitePool,
}

fn storage_error(e: impl ToString) -> IndexerError {
    IndexerError::Storage(e.to_string())
}

fn persistence_error(entity: &str, id: &str, e: impl ToString) -> IndexerError {
    IndexerError::Persistence {
        entity: entity.to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    }
}

impl SqliteEntityStore {
    /// Open the entity database at `path`, creating the file and the
    /// `entities` table if missing. The file is journaled in WAL mode.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(storage_error)?;
        tracing::debug!(path = %path.as_ref().display(), "Entity database opened");
        Self::with_pool(pool).await
    }

    /// A private in-memory entity database, dropped with the store.
    pub async fn in_memory() -> Result<Self, IndexerError> {
        // `:memory:` is per connection, so the pool must never open a second one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_error)?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, IndexerError> {
        sqlx::query(CREATE_ENTITIES)
            .execute(&pool)
            .await
            .map_err(storage_error)?;
        Ok(Self { pool })
    }

    /// Number of stored records of one entity.
    pub async fn count(&self, entity: &str) -> Result<u64, IndexerError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM entities WHERE entity = ?")
            .bind(entity)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let cnt: i64 = row.get("cnt");
        Ok(cnt as u64)
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn save(
        &self,
        entity: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), IndexerError> {
        let data = serde_json::to_string(&record).map_err(|e| persistence_error(entity, id, e))?;

        sqlx::query("INSERT OR REPLACE INTO entities (entity, id, data) VALUES (?, ?, ?)")
            .bind(entity)
            .bind(id)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| persistence_error(entity, id, e))?;

        tracing::debug!(entity, id, "Entity stored");
        Ok(())
    }

    async fn load(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError> {
        let row = sqlx::query("SELECT data FROM entities WHERE entity = ? AND id = ?")
            .bind(entity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match row {
            Some(row) => {
                let data: String = row.get("data");
                serde_json::from_str(&data)
                    .map(Some)
                    .map_err(|e| persistence_error(entity, id, e))
            }
            None => Ok(None),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_and_load() {
        let store = SqliteEntityStore::in_memory().await.unwrap();
        store
            .save("AvalancheTransaction", "0xB1-0xT1", json!({ "blockId": "0xB1" }))
            .await
            .unwrap();

        let loaded = store.load("AvalancheTransaction", "0xB1-0xT1").await.unwrap().unwrap();
        assert_eq!(loaded["blockId"], "0xB1");
        assert!(store.load("AvalancheTransaction", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_is_upsert() {
        let store = SqliteEntityStore::in_memory().await.unwrap();
        store.save("Tx", "a", json!({ "v": 1 })).await.unwrap();
        store.save("Tx", "a", json!({ "v": 2 })).await.unwrap();

        assert_eq!(store.count("Tx").await.unwrap(), 1);
        assert_eq!(store.load("Tx", "a").await.unwrap().unwrap()["v"], 2);
    }

    #[tokio::test]
    async fn entity_names_are_isolated() {
        let store = SqliteEntityStore::in_memory().await.unwrap();
        store.save("Block", "x", json!(1)).await.unwrap();
        store.save("Event", "x", json!(2)).await.unwrap();

        assert_eq!(store.load("Block", "x").await.unwrap().unwrap(), json!(1));
        assert_eq!(store.load("Event", "x").await.unwrap().unwrap(), json!(2));
        assert_eq!(store.count("Block").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("blockmap-entities-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let store = SqliteEntityStore::open(&path).await.unwrap();
        store.save("Block", "0xb1", json!({ "number": 1 })).await.unwrap();
        drop(store);

        let reopened = SqliteEntityStore::open(&path).await.unwrap();
        assert_eq!(reopened.load("Block", "0xb1").await.unwrap().unwrap()["number"], 1);
        assert_eq!(reopened.count("Block").await.unwrap(), 1);

        drop(reopened);
        let _ = std::fs::remove_file(&path);
    }
}
