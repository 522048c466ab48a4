//! Block wrapper for Algorand indexer blocks.

use serde_json::{Map, Value};

use blockmap_core::{BlockWrapper, ChainFamily, IndexerError, NoFilter};

/// A block as returned by the Algorand indexer (`/v2/blocks/{round}`).
pub type AlgorandBlock = Map<String, Value>;
/// One entry of the block's `transactions` array.
pub type AlgorandTransaction = Map<String, Value>;
/// Algorand has no event records; kept for symmetry with the other families.
pub type AlgorandEvent = Map<String, Value>;

/// Read-only view over one [`AlgorandBlock`].
#[derive(Debug, Clone)]
pub struct AlgorandBlockWrapper {
    block: AlgorandBlock,
    round: u64,
    hash: String,
}

impl AlgorandBlockWrapper {
    /// Wrap a block. The height comes from `round`; the hash from `hash`
    /// (or the older `block-hash`).
    pub fn new(block: AlgorandBlock) -> Result<Self, IndexerError> {
        let round = block
            .get("round")
            .and_then(Value::as_u64)
            .ok_or_else(|| IndexerError::MalformedBlock("block has no numeric 'round'".into()))?;
        let hash = block
            .get("hash")
            .or_else(|| block.get("block-hash"))
            .and_then(Value::as_str)
            .ok_or_else(|| IndexerError::MalformedBlock(format!("block {round} has no hash")))?
            .to_string();
        Ok(Self { block, round, hash })
    }

    /// Wrap a block from indexer JSON.
    pub fn from_json(value: Value) -> Result<Self, IndexerError> {
        match value {
            Value::Object(block) => Self::new(block),
            other => Err(IndexerError::MalformedBlock(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub fn into_inner(self) -> AlgorandBlock {
        self.block
    }

    /// Raw transactions in block order. Non-object entries are skipped.
    pub fn transactions(&self) -> Vec<&AlgorandTransaction> {
        let txns: Vec<_> = self
            .block
            .get("transactions")
            .and_then(Value::as_array)
            .map(|txs| txs.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default();
        tracing::debug!(round = self.round, transactions = txns.len(), "Algorand transactions");
        txns
    }
}

impl BlockWrapper for AlgorandBlockWrapper {
    type Block = AlgorandBlock;
    type Call = AlgorandTransaction;
    type Event = AlgorandEvent;
    type CallFilter = NoFilter;
    type EventFilter = NoFilter;

    const FAMILY: ChainFamily = ChainFamily::Algorand;

    fn block(&self) -> &AlgorandBlock {
        &self.block
    }

    fn block_height(&self) -> u64 {
        self.round
    }

    fn hash(&self) -> &str {
        &self.hash
    }
}

impl TryFrom<AlgorandBlock> for AlgorandBlockWrapper {
    type Error = IndexerError;

    fn try_from(block: AlgorandBlock) -> Result<Self, Self::Error> {
        Self::new(block)
    }
}
