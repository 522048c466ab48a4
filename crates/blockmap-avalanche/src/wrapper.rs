//! Block wrapper for Avalanche C-Chain blocks.

use serde_json::{Map, Value};

use blockmap_core::{BlockWrapper, ChainFamily, FilterArg, IndexerError};

use crate::filter::{AvalancheCallFilter, AvalancheEventFilter};
use crate::types::{parse_quantity, AvalancheBlock, AvalancheEvent, AvalancheTransaction};

/// Read-only view over one [`AvalancheBlock`].
#[derive(Debug, Clone)]
pub struct AvalancheBlockWrapper {
    block: AvalancheBlock,
    height: u64,
}

impl AvalancheBlockWrapper {
    /// Wrap a block. Fails if the block has no hash or its number is not a
    /// quantity.
    pub fn new(block: AvalancheBlock) -> Result<Self, IndexerError> {
        if block.hash.is_empty() {
            return Err(IndexerError::MalformedBlock("block has no hash".into()));
        }
        let height = parse_quantity(&block.number).ok_or_else(|| {
            IndexerError::MalformedBlock(format!("invalid block number '{}'", block.number))
        })?;
        Ok(Self { block, height })
    }

    /// Decode and wrap a block from node JSON.
    pub fn from_json(value: Value) -> Result<Self, IndexerError> {
        let block: AvalancheBlock = serde_json::from_value(value)
            .map_err(|e| IndexerError::MalformedBlock(e.to_string()))?;
        Self::new(block)
    }

    pub fn into_inner(self) -> AvalancheBlock {
        self.block
    }

    /// The named top-level block fields (RPC names, e.g. `"gasUsed"`).
    /// Unknown names are left out.
    pub fn get(&self, fields: &[&str]) -> Map<String, Value> {
        match serde_json::to_value(&self.block) {
            Ok(Value::Object(all)) => project(&all, Some(fields)),
            _ => Map::new(),
        }
    }

    /// Every transaction, projected to the named fields (all fields for `None`).
    pub fn get_transactions(&self, fields: Option<&[&str]>) -> Vec<Map<String, Value>> {
        self.block
            .transactions
            .iter()
            .filter_map(|tx| match serde_json::to_value(tx) {
                Ok(Value::Object(all)) => Some(project(&all, fields)),
                _ => None,
            })
            .collect()
    }
}

fn project(all: &Map<String, Value>, fields: Option<&[&str]>) -> Map<String, Value> {
    match fields {
        None => all.clone(),
        Some(fields) => fields
            .iter()
            .filter_map(|f| all.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect(),
    }
}

impl TryFrom<AvalancheBlock> for AvalancheBlockWrapper {
    type Error = IndexerError;

    fn try_from(block: AvalancheBlock) -> Result<Self, Self::Error> {
        Self::new(block)
    }
}

impl BlockWrapper for AvalancheBlockWrapper {
    type Block = AvalancheBlock;
    type Call = AvalancheTransaction;
    type Event = AvalancheEvent;
    type CallFilter = AvalancheCallFilter;
    type EventFilter = AvalancheEventFilter;

    const FAMILY: ChainFamily = ChainFamily::Avalanche;

    fn block(&self) -> &AvalancheBlock {
        &self.block
    }

    fn block_height(&self) -> u64 {
        self.height
    }

    fn hash(&self) -> &str {
        &self.block.hash
    }

    fn calls<'f>(
        &self,
        filters: impl Into<FilterArg<'f, AvalancheCallFilter>>,
    ) -> Result<Vec<&AvalancheTransaction>, IndexerError>
    where
        AvalancheCallFilter: 'f,
    {
        let filters = filters.into();
        let calls = filters.select(&self.block.transactions, &self.context());
        tracing::debug!(
            height = self.height,
            matched = calls.len(),
            total = self.block.transactions.len(),
            "Selected transactions"
        );
        Ok(calls)
    }

    fn events<'f>(
        &self,
        filters: impl Into<FilterArg<'f, AvalancheEventFilter>>,
    ) -> Result<Vec<&AvalancheEvent>, IndexerError>
    where
        AvalancheEventFilter: 'f,
    {
        let filters = filters.into();
        let events = filters.select(&self.block.logs, &self.context());
        tracing::debug!(
            height = self.height,
            matched = events.len(),
            total = self.block.logs.len(),
            "Selected logs"
        );
        Ok(events)
    }
}
