//! Raw Substrate block, extrinsic and event shapes.
//!
//! Extrinsics and events refer back to their block by number and hash only;
//! the block owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One block with its extrinsics and events, as supplied by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateBlock {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    /// Parent block's runtime spec version; selects the metadata used to
    /// decode this block.
    pub spec_version: u32,
    pub timestamp: DateTime<Utc>,
    /// Extrinsics in block order.
    #[serde(default)]
    pub extrinsics: Vec<SubstrateExtrinsic>,
    /// Events in block order.
    #[serde(default)]
    pub events: Vec<SubstrateEvent>,
}

/// An extrinsic (call) included in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateExtrinsic {
    /// Index in the block.
    pub idx: u32,
    pub block_number: u64,
    pub block_hash: String,
    pub hash: String,
    /// Pallet / section, e.g. `"balances"`.
    pub module: String,
    /// Call name, e.g. `"transfer"`.
    pub method: String,
    /// Signing account, absent for unsigned extrinsics.
    #[serde(default)]
    pub signer: Option<String>,
    /// Destination account for calls that have one.
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub args: serde_json::Value,
    pub success: bool,
    /// Block indices of the events this extrinsic emitted.
    #[serde(default)]
    pub events: Vec<u32>,
}

/// An event record emitted in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateEvent {
    /// Index in the block.
    pub idx: u32,
    pub block_number: u64,
    pub block_hash: String,
    /// Index of the emitting extrinsic, if emitted during one.
    #[serde(default)]
    pub extrinsic_idx: Option<u32>,
    pub module: String,
    pub method: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl SubstrateExtrinsic {
    /// Stable identity: `<blockHash>-<idx>`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.block_hash, self.idx)
    }
}

impl SubstrateEvent {
    /// Stable identity: `<blockHash>-<idx>`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.block_hash, self.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_block_json() {
        let block: SubstrateBlock = serde_json::from_value(serde_json::json!({
            "number": 12,
            "hash": "0xb12",
            "parentHash": "0xb11",
            "specVersion": 9430,
            "timestamp": "2023-06-01T00:00:00Z",
            "extrinsics": [{
                "idx": 0,
                "blockNumber": 12,
                "blockHash": "0xb12",
                "hash": "0xe0",
                "module": "timestamp",
                "method": "set",
                "success": true
            }],
            "events": [{
                "idx": 0,
                "blockNumber": 12,
                "blockHash": "0xb12",
                "extrinsicIdx": 0,
                "module": "system",
                "method": "ExtrinsicSuccess"
            }]
        }))
        .unwrap();

        assert_eq!(block.spec_version, 9430);
        assert_eq!(block.extrinsics[0].signer, None);
        assert_eq!(block.extrinsics[0].id(), "0xb12-0");
        assert_eq!(block.events[0].extrinsic_idx, Some(0));
        assert!(block.events[0].topics.is_empty());
    }
}
