//! In-memory entity store.
//!
//! Keeps every saved record in RAM, keyed by `(entity, id)`. Useful for tests
//! and one-shot runs such as `blockmap map`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use blockmap_core::{EntityStore, IndexerError};

type Key = (String, String);

/// In-memory entity store.
///
/// All data is lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryEntityStore {
    records: Mutex<BTreeMap<Key, serde_json::Value>>,
    saves: Mutex<u64>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct `(entity, id)` records.
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `save` calls, including overwrites.
    pub fn save_count(&self) -> u64 {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All records of one entity, ordered by id.
    pub fn entities(&self, entity: &str) -> Vec<(String, serde_json::Value)> {
        self.lock_records()
            .iter()
            .filter(|((name, _), _)| name == entity)
            .map(|((_, id), record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Every record as `{ entity: { id: record } }`.
    pub fn snapshot(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for ((entity, id), record) in self.lock_records().iter() {
            let group = out
                .entry(entity.clone())
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
            if let serde_json::Value::Object(group) = group {
                group.insert(id.clone(), record.clone());
            }
        }
        serde_json::Value::Object(out)
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, BTreeMap<Key, serde_json::Value>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn save(
        &self,
        entity: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), IndexerError> {
        self.lock_records()
            .insert((entity.to_string(), id.to_string()), record);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        tracing::trace!(entity, id, "Entity saved");
        Ok(())
    }

    async fn load(
        &self,
        entity: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError> {
        Ok(self
            .lock_records()
            .get(&(entity.to_string(), id.to_string()))
            .cloned())
    }
}
