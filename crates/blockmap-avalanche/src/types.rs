//! Raw Avalanche C-Chain shapes, as returned by `eth_getBlockByNumber` (with
//! full transactions) and `eth_getLogs`.
//!
//! Quantities stay as the node's hex strings; [`parse_quantity`] converts the
//! ones the wrapper needs.

use serde::{Deserialize, Serialize};

/// One block with its transactions and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvalancheBlock {
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
    /// Transactions in block order.
    pub transactions: Vec<AvalancheTransaction>,
    pub transactions_root: String,
    pub uncles: Vec<String>,
    /// Logs emitted in this block, in `logIndex` order.
    pub logs: Vec<AvalancheEvent>,
}

/// A transaction included in a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvalancheTransaction {
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub gas: String,
    pub gas_price: String,
    pub hash: String,
    pub input: String,
    pub nonce: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub transaction_index: String,
    pub value: String,
    pub v: String,
    pub r: String,
    pub s: String,
}

/// A log emitted by a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvalancheEvent {
    pub log_index: String,
    pub block_number: String,
    pub block_hash: String,
    pub transaction_hash: String,
    pub transaction_index: String,
    pub address: String,
    pub data: String,
    pub topics: Vec<String>,
}

impl AvalancheTransaction {
    /// The 4-byte function selector (`0x` + 8 hex chars) at the start of the
    /// input, if the input is long enough.
    pub fn selector(&self) -> Option<&str> {
        self.input.get(..10).filter(|s| s.starts_with("0x"))
    }
}

/// Parse a node quantity: `0x`-prefixed hex, or plain decimal.
pub fn parse_quantity(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
