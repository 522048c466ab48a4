//! Avalanche call and event filters.
//!
//! Address comparisons are case-insensitive: nodes return checksummed or
//! lowercase hex interchangeably.

use serde::{Deserialize, Serialize};

use blockmap_core::filter::{lenient, BlockContext, RecordFilter};

use crate::signature::{FunctionSelector, Topic};
use crate::types::{AvalancheEvent, AvalancheTransaction};

/// Transaction filter: sender, recipient and called function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvalancheCallFilter {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Function selector or signature.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionSelector>,
}

impl AvalancheCallFilter {
    /// Only transactions sent by `address`.
    pub fn sender(address: impl Into<String>) -> Self {
        Self {
            from: Some(address.into()),
            ..Default::default()
        }
    }

    /// Only transactions sent to `address`.
    pub fn recipient(address: impl Into<String>) -> Self {
        Self {
            to: Some(address.into()),
            ..Default::default()
        }
    }

    /// Additionally require the called function.
    pub fn function(mut self, function: impl Into<FunctionSelector>) -> Self {
        self.function = Some(function.into());
        self
    }
}

// Addresses and selectors compare as hex strings, ignoring ASCII case.
impl RecordFilter<AvalancheTransaction> for AvalancheCallFilter {
    fn matches(&self, tx: &AvalancheTransaction, _block: &BlockContext<'_>) -> bool {
        if let Some(from) = &self.from {
            if !from.eq_ignore_ascii_case(&tx.from) {
                return false;
            }
        }
        if let Some(to) = &self.to {
            match &tx.to {
                Some(tx_to) if to.eq_ignore_ascii_case(tx_to) => {}
                _ => return false,
            }
        }
        if let Some(function) = &self.function {
            match tx.selector() {
                Some(selector) if function.matches(selector) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Log filter: emitting contract and positional topics.
///
/// `topics[i] = None` leaves position `i` unconstrained. Positions beyond the
/// filter's list are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvalancheEventFilter {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<Topic>>>,
}

impl AvalancheEventFilter {
    /// Only logs emitted by `address`.
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    /// Only logs whose topics match `topics` position by position.
    pub fn topics<I, T>(topics: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
        T: Into<Topic>,
    {
        Self {
            topics: Some(topics.into_iter().map(|t| t.map(Into::into)).collect()),
            ..Default::default()
        }
    }

    /// Additionally require the emitting contract.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

// Address and topics compare as hex strings, ignoring ASCII case.
impl RecordFilter<AvalancheEvent> for AvalancheEventFilter {
    fn matches(&self, log: &AvalancheEvent, _block: &BlockContext<'_>) -> bool {
        if let Some(address) = &self.address {
            if !address.eq_ignore_ascii_case(&log.address) {
                return false;
            }
        }
        let Some(topics) = &self.topics else {
            return true;
        };
        topics.iter().enumerate().all(|(i, want)| match want {
            None => true,
            Some(want) => log.topics.get(i).map_or(false, |have| want.matches(have)),
        })
    }
}
