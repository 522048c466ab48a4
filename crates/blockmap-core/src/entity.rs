//! Persisted entities and the storage contract they are saved through.
//!
//! The store is keyed by `(entity name, id)`; ids are derived deterministically
//! from immutable source fields, so saving the same record twice is an upsert
//! with identical contents.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::IndexerError;

/// A durable record produced by a mapping handler.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Entity (table) name, e.g. `"AvalancheTransaction"`.
    const ENTITY: &'static str;

    /// Deterministic identity key.
    fn id(&self) -> &str;
}

/// Persistence collaborator used by mapping handlers.
///
/// Implementations include `InMemoryEntityStore` and `SqliteEntityStore`
/// (blockmap-storage). A failed save must be reported as
/// [`IndexerError::Persistence`]; callers never retry.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Save (upsert) one entity record.
    async fn save(
        &self,
        entity: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), IndexerError>;

    /// Load an entity record by id.
    async fn load(&self, entity: &str, id: &str)
        -> Result<Option<serde_json::Value>, IndexerError>;
}

/// Typed helpers over any [`EntityStore`].
#[async_trait]
pub trait EntityStoreExt: EntityStore {
    /// Serialize and save a typed entity.
    async fn save_entity<E: Entity>(&self, entity: &E) -> Result<(), IndexerError> {
        let record = serde_json::to_value(entity)
            .map_err(|e| IndexerError::persistence(E::ENTITY, entity.id(), e))?;
        self.save(E::ENTITY, entity.id(), record).await
    }

    /// Load and deserialize a typed entity.
    async fn load_entity<E: Entity>(&self, id: &str) -> Result<Option<E>, IndexerError> {
        match self.load(E::ENTITY, id).await? {
            Some(record) => serde_json::from_value(record)
                .map(Some)
                .map_err(|e| IndexerError::persistence(E::ENTITY, id, e)),
            None => Ok(None),
        }
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}
