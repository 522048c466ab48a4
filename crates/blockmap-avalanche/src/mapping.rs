//! Mappings from raw Avalanche records to persisted entities.
//!
//! Each handler copies every source field into its entity and saves it. Ids
//! are derived from immutable fields only:
//!
//! | entity                 | id                         |
//! |------------------------|----------------------------|
//! | `AvalancheBlock`       | `<hash>`                   |
//! | `AvalancheTransaction` | `<blockHash>-<hash>`       |
//! | `AvalancheEvent`       | `<blockHash>-<logIndex>`   |
//!
//! Filtering has already happened by the time a record reaches a handler.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use blockmap_core::handler::{BlockHandler, CallHandler, EventHandler, HandlerCatalog};
use blockmap_core::{BlockWrapper, Entity, EntityStore, EntityStoreExt, IndexerError};

use crate::types::{AvalancheEvent, AvalancheTransaction};
use crate::wrapper::AvalancheBlockWrapper;

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheBlockEntity {
    pub id: String,
    pub difficulty: String,
    pub extra_data: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub hash: String,
    pub logs_bloom: String,
    pub miner: String,
    pub mix_hash: String,
    pub nonce: String,
    pub number: String,
    pub parent_hash: String,
    pub receipts_root: String,
    pub sha3_uncles: String,
    pub size: String,
    pub state_root: String,
    pub timestamp: String,
    pub total_difficulty: String,
    pub transactions_root: String,
    pub uncles: Vec<String>,
}

impl Entity for AvalancheBlockEntity {
    const ENTITY: &'static str = "AvalancheBlock";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheTransactionEntity {
    pub id: String,
    /// Reference to the containing `AvalancheBlock`.
    pub block_id: String,
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub gas: String,
    pub gas_price: String,
    pub hash: String,
    pub input: String,
    pub nonce: String,
    pub r: String,
    pub s: String,
    pub to: Option<String>,
    pub transaction_index: String,
    pub v: String,
    pub value: String,
}

impl Entity for AvalancheTransactionEntity {
    const ENTITY: &'static str = "AvalancheTransaction";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheEventEntity {
    pub id: String,
    /// Reference to the containing `AvalancheBlock`.
    pub block_id: String,
    pub address: String,
    pub block_hash: String,
    pub block_number: String,
    pub data: String,
    pub log_index: String,
    pub topics: Vec<String>,
    pub transaction_hash: String,
    pub transaction_index: String,
}

impl Entity for AvalancheEventEntity {
    const ENTITY: &'static str = "AvalancheEvent";

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&AvalancheBlockWrapper> for AvalancheBlockEntity {
    fn from(wrapper: &AvalancheBlockWrapper) -> Self {
        let b = wrapper.block();
        Self {
            id: b.hash.clone(),
            difficulty: b.difficulty.clone(),
            extra_data: b.extra_data.clone(),
            gas_limit: b.gas_limit.clone(),
            gas_used: b.gas_used.clone(),
            hash: b.hash.clone(),
            logs_bloom: b.logs_bloom.clone(),
            miner: b.miner.clone(),
            mix_hash: b.mix_hash.clone(),
            nonce: b.nonce.clone(),
            number: b.number.clone(),
            parent_hash: b.parent_hash.clone(),
            receipts_root: b.receipts_root.clone(),
            sha3_uncles: b.sha3_uncles.clone(),
            size: b.size.clone(),
            state_root: b.state_root.clone(),
            timestamp: b.timestamp.clone(),
            total_difficulty: b.total_difficulty.clone(),
            transactions_root: b.transactions_root.clone(),
            uncles: b.uncles.clone(),
        }
    }
}

impl From<&AvalancheTransaction> for AvalancheTransactionEntity {
    fn from(tx: &AvalancheTransaction) -> Self {
        Self {
            id: format!("{}-{}", tx.block_hash, tx.hash),
            block_id: tx.block_hash.clone(),
            block_hash: tx.block_hash.clone(),
            block_number: tx.block_number.clone(),
            from: tx.from.clone(),
            gas: tx.gas.clone(),
            gas_price: tx.gas_price.clone(),
            hash: tx.hash.clone(),
            input: tx.input.clone(),
            nonce: tx.nonce.clone(),
            r: tx.r.clone(),
            s: tx.s.clone(),
            to: tx.to.clone(),
            transaction_index: tx.transaction_index.clone(),
            v: tx.v.clone(),
            value: tx.value.clone(),
        }
    }
}

impl From<&AvalancheEvent> for AvalancheEventEntity {
    fn from(log: &AvalancheEvent) -> Self {
        Self {
            id: format!("{}-{}", log.block_hash, log.log_index),
            block_id: log.block_hash.clone(),
            address: log.address.clone(),
            block_hash: log.block_hash.clone(),
            block_number: log.block_number.clone(),
            data: log.data.clone(),
            log_index: log.log_index.clone(),
            topics: log.topics.clone(),
            transaction_hash: log.transaction_hash.clone(),
            transaction_index: log.transaction_index.clone(),
        }
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// Persist one block.
pub async fn handle_block(
    block: &AvalancheBlockWrapper,
    store: &dyn EntityStore,
) -> Result<(), IndexerError> {
    let record = AvalancheBlockEntity::from(block);
    store.save_entity(&record).await?;
    tracing::debug!(id = %record.id, "Saved AvalancheBlock");
    Ok(())
}

/// Persist one transaction.
pub async fn handle_call(
    transaction: &AvalancheTransaction,
    store: &dyn EntityStore,
) -> Result<(), IndexerError> {
    let record = AvalancheTransactionEntity::from(transaction);
    store.save_entity(&record).await?;
    tracing::debug!(id = %record.id, "Saved AvalancheTransaction");
    Ok(())
}

/// Persist one log.
pub async fn handle_event(
    event: &AvalancheEvent,
    store: &dyn EntityStore,
) -> Result<(), IndexerError> {
    let record = AvalancheEventEntity::from(event);
    store.save_entity(&record).await?;
    tracing::debug!(id = %record.id, "Saved AvalancheEvent");
    Ok(())
}

/// The three mappings as registry handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvalancheMappings;

impl AvalancheMappings {
    /// Catalog exposing the mappings under `handleBlock`, `handleCall` and
    /// `handleEvent`.
    pub fn catalog() -> HandlerCatalog<AvalancheBlockWrapper> {
        let mappings = std::sync::Arc::new(Self);
        HandlerCatalog::new()
            .block("handleBlock", mappings.clone())
            .call("handleCall", mappings.clone())
            .event("handleEvent", mappings)
    }
}

#[async_trait]
impl BlockHandler<AvalancheBlockWrapper> for AvalancheMappings {
    async fn handle_block(
        &self,
        block: &AvalancheBlockWrapper,
        store: &dyn EntityStore,
    ) -> Result<(), IndexerError> {
        handle_block(block, store).await
    }
}

#[async_trait]
impl CallHandler<AvalancheBlockWrapper> for AvalancheMappings {
    async fn handle_call(
        &self,
        call: &AvalancheTransaction,
        store: &dyn EntityStore,
    ) -> Result<(), IndexerError> {
        handle_call(call, store).await
    }
}

#[async_trait]
impl EventHandler<AvalancheBlockWrapper> for AvalancheMappings {
    async fn handle_event(
        &self,
        event: &AvalancheEvent,
        store: &dyn EntityStore,
    ) -> Result<(), IndexerError> {
        handle_event(event, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every save in order.
    #[derive(Default)]
    struct Journal(Mutex<Vec<(String, String, serde_json::Value)>>);

    #[async_trait]
    impl EntityStore for Journal {
        async fn save(
            &self,
            entity: &str,
            id: &str,
            record: serde_json::Value,
        ) -> Result<(), IndexerError> {
            self.0
                .lock()
                .unwrap()
                .push((entity.to_string(), id.to_string(), record));
            Ok(())
        }

        async fn load(
            &self,
            _entity: &str,
            _id: &str,
        ) -> Result<Option<serde_json::Value>, IndexerError> {
            Ok(None)
        }
    }

    struct Unavailable;

    #[async_trait]
    impl EntityStore for Unavailable {
        async fn save(&self, entity: &str, id: &str, _: serde_json::Value) -> Result<(), IndexerError> {
            Err(IndexerError::Persistence {
                entity: entity.into(),
                id: id.into(),
                reason: "connection refused".into(),
            })
        }

        async fn load(&self, _: &str, _: &str) -> Result<Option<serde_json::Value>, IndexerError> {
            Ok(None)
        }
    }

    fn transaction() -> AvalancheTransaction {
        AvalancheTransaction {
            hash: "0xT1".into(),
            block_hash: "0xB1".into(),
            block_number: "0x1".into(),
            from: "0xF".into(),
            to: Some("0xG".into()),
            value: "100".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn call_entity_id_and_block_ref() {
        let journal = Journal::default();
        handle_call(&transaction(), &journal).await.unwrap();

        let saves = journal.0.lock().unwrap();
        let (entity, id, record) = &saves[0];
        assert_eq!(entity, "AvalancheTransaction");
        assert_eq!(id, "0xB1-0xT1");
        assert_eq!(record["blockId"], "0xB1");
        assert_eq!(record["from"], "0xF");
        assert_eq!(record["to"], "0xG");
        assert_eq!(record["value"], "100");
    }

    #[tokio::test]
    async fn event_entity_id() {
        let journal = Journal::default();
        let log = AvalancheEvent {
            block_hash: "0xB1".into(),
            log_index: "2".into(),
            address: "0xA".into(),
            topics: vec!["0xTopic1".into()],
            ..Default::default()
        };
        handle_event(&log, &journal).await.unwrap();

        let saves = journal.0.lock().unwrap();
        assert_eq!(saves[0].1, "0xB1-2");
        assert_eq!(saves[0].2["topics"], serde_json::json!(["0xTopic1"]));
        assert_eq!(saves[0].2["blockId"], "0xB1");
    }

    #[tokio::test]
    async fn mapping_is_idempotent() {
        let journal = Journal::default();
        let tx = transaction();
        handle_call(&tx, &journal).await.unwrap();
        handle_call(&tx, &journal).await.unwrap();

        let saves = journal.0.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0], saves[1]);
    }

    #[tokio::test]
    async fn block_entity_copies_fields() {
        let journal = Journal::default();
        let wrapper = AvalancheBlockWrapper::from_json(serde_json::json!({
            "hash": "0xB1",
            "number": "0x1",
            "miner": "0xM",
            "uncles": ["0xU"],
            "transactions": [{ "hash": "0xT1", "blockHash": "0xB1" }]
        }))
        .unwrap();
        handle_block(&wrapper, &journal).await.unwrap();

        let saves = journal.0.lock().unwrap();
        let (entity, id, record) = &saves[0];
        assert_eq!(entity, "AvalancheBlock");
        assert_eq!(id, "0xB1");
        assert_eq!(record["miner"], "0xM");
        assert_eq!(record["uncles"], serde_json::json!(["0xU"]));
        assert!(record.get("transactions").is_none());
    }

    #[tokio::test]
    async fn save_failure_is_surfaced() {
        let err = handle_call(&transaction(), &Unavailable).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(err.to_string().contains("0xB1-0xT1"));
    }

    #[test]
    fn catalog_names() {
        let catalog = AvalancheMappings::catalog();
        assert!(catalog.get("handleBlock").is_some());
        assert!(catalog.get("handleCall").is_some());
        assert!(catalog.get("handleEvent").is_some());
        assert!(catalog.get("handleTransfer").is_none());
    }
}
