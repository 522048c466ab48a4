//! Block wrapper for Substrate blocks.

use blockmap_core::{BlockWrapper, ChainFamily, FilterArg, IndexerError};

use crate::filter::{SubqlCallFilter, SubqlEventFilter};
use crate::types::{SubstrateBlock, SubstrateEvent, SubstrateExtrinsic};

/// Read-only view over one [`SubstrateBlock`].
#[derive(Debug, Clone)]
pub struct SubstrateBlockWrapper {
    block: SubstrateBlock,
}

impl SubstrateBlockWrapper {
    pub fn new(block: SubstrateBlock) -> Self {
        Self { block }
    }

    pub fn into_inner(self) -> SubstrateBlock {
        self.block
    }

    /// Events emitted by `extrinsic`, in block order.
    pub fn extrinsic_events(&self, extrinsic: &SubstrateExtrinsic) -> Vec<&SubstrateEvent> {
        self.block
            .events
            .iter()
            .filter(|e| e.extrinsic_idx == Some(extrinsic.idx))
            .collect()
    }

    /// The extrinsic that emitted `event`, if any.
    pub fn extrinsic_of(&self, event: &SubstrateEvent) -> Option<&SubstrateExtrinsic> {
        let idx = event.extrinsic_idx?;
        self.block.extrinsics.iter().find(|x| x.idx == idx)
    }
}

impl From<SubstrateBlock> for SubstrateBlockWrapper {
    fn from(block: SubstrateBlock) -> Self {
        Self::new(block)
    }
}

impl BlockWrapper for SubstrateBlockWrapper {
    type Block = SubstrateBlock;
    type Call = SubstrateExtrinsic;
    type Event = SubstrateEvent;
    type CallFilter = SubqlCallFilter;
    type EventFilter = SubqlEventFilter;

    const FAMILY: ChainFamily = ChainFamily::Substrate;

    fn block(&self) -> &SubstrateBlock {
        &self.block
    }

    fn block_height(&self) -> u64 {
        self.block.number
    }

    fn hash(&self) -> &str {
        &self.block.hash
    }

    fn spec_version(&self) -> Option<u32> {
        Some(self.block.spec_version)
    }

    fn calls<'f>(
        &self,
        filters: impl Into<FilterArg<'f, SubqlCallFilter>>,
    ) -> Result<Vec<&SubstrateExtrinsic>, IndexerError>
    where
        SubqlCallFilter: 'f,
    {
        let filters = filters.into();
        let calls = filters.select(&self.block.extrinsics, &self.context());
        tracing::debug!(
            height = self.block.number,
            matched = calls.len(),
            total = self.block.extrinsics.len(),
            "Selected extrinsics"
        );
        Ok(calls)
    }

    fn events<'f>(
        &self,
        filters: impl Into<FilterArg<'f, SubqlEventFilter>>,
    ) -> Result<Vec<&SubstrateEvent>, IndexerError>
    where
        SubqlEventFilter: 'f,
    {
        let filters = filters.into();
        let events = filters.select(&self.block.events, &self.context());
        tracing::debug!(
            height = self.block.number,
            matched = events.len(),
            total = self.block.events.len(),
            "Selected events"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmap_core::SpecVersionRange;
    use chrono::TimeZone;

    fn extrinsic(idx: u32, module: &str, method: &str, success: bool) -> SubstrateExtrinsic {
        SubstrateExtrinsic {
            idx,
            block_number: 100,
            block_hash: "0xb100".into(),
            hash: format!("0xe{idx}"),
            module: module.into(),
            method: method.into(),
            signer: Some("alice".into()),
            dest: None,
            args: serde_json::Value::Null,
            success,
            events: vec![],
        }
    }

    fn event(idx: u32, extrinsic_idx: Option<u32>, module: &str, method: &str) -> SubstrateEvent {
        SubstrateEvent {
            idx,
            block_number: 100,
            block_hash: "0xb100".into(),
            extrinsic_idx,
            module: module.into(),
            method: method.into(),
            data: serde_json::Value::Null,
            topics: vec![],
        }
    }

    fn wrapper() -> SubstrateBlockWrapper {
        SubstrateBlockWrapper::new(SubstrateBlock {
            number: 100,
            hash: "0xb100".into(),
            parent_hash: "0xb099".into(),
            spec_version: 15,
            timestamp: chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            extrinsics: vec![
                extrinsic(0, "timestamp", "set", true),
                extrinsic(1, "balances", "transfer", true),
                extrinsic(2, "balances", "transfer", false),
                extrinsic(3, "staking", "bond", true),
            ],
            events: vec![
                event(0, Some(1), "balances", "Transfer"),
                event(1, Some(1), "system", "ExtrinsicSuccess"),
                event(2, Some(2), "system", "ExtrinsicFailed"),
                event(3, None, "staking", "EraPaid"),
            ],
        })
    }

    #[test]
    fn scalars() {
        let w = wrapper();
        assert_eq!(w.block_height(), 100);
        assert_eq!(w.hash(), "0xb100");
        assert_eq!(w.spec_version(), Some(15));
        assert_eq!(SubstrateBlockWrapper::FAMILY, ChainFamily::Substrate);
    }

    #[test]
    fn calls_without_filter_returns_everything_in_order() {
        let w = wrapper();
        let idx: Vec<u32> = w
            .calls(FilterArg::<SubqlCallFilter>::All)
            .unwrap()
            .iter()
            .map(|c| c.idx)
            .collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
    }

    #[test]
    fn calls_or_across_filters() {
        let w = wrapper();
        let filters = vec![
            SubqlCallFilter::new("balances", "transfer").success(true),
            SubqlCallFilter::new("staking", "bond"),
        ];
        let idx: Vec<u32> = w.calls(&filters).unwrap().iter().map(|c| c.idx).collect();
        assert_eq!(idx, vec![1, 3]);
    }

    #[test]
    fn spec_version_outside_range_matches_nothing() {
        let w = wrapper();
        let f = SubqlEventFilter::default().spec_version(SpecVersionRange::new(16, 30).unwrap());
        assert!(w.events(&f).unwrap().is_empty());

        let f = SubqlEventFilter::default().spec_version(SpecVersionRange::new(1, 15).unwrap());
        assert_eq!(w.events(&f).unwrap().len(), 4);
    }

    #[test]
    fn event_extrinsic_links() {
        let w = wrapper();
        let transfer = &w.block().extrinsics[1];
        let emitted: Vec<u32> = w.extrinsic_events(transfer).iter().map(|e| e.idx).collect();
        assert_eq!(emitted, vec![0, 1]);

        let era = &w.block().events[3];
        assert!(w.extrinsic_of(era).is_none());
        assert_eq!(w.extrinsic_of(&w.block().events[2]).unwrap().idx, 2);
    }
}
