//! The chain-agnostic block wrapper.

use crate::chain::ChainFamily;
use crate::error::IndexerError;
use crate::filter::{BlockContext, FilterArg, RecordFilter};

/// A read-only projection over one block of one chain family.
///
/// Consumers ask for calls and events matching zero or more filters without
/// knowing how the family encodes them. Accessors are pure queries over the
/// wrapped snapshot, so a wrapper may be shared between concurrent consumers.
///
/// Families with no filterable call/event structure keep the default
/// `calls`/`events`, which return [`IndexerError::Unsupported`] rather than an
/// empty list.
pub trait BlockWrapper: Send + Sync {
    /// Raw block snapshot.
    type Block: Send + Sync;
    /// Transaction / extrinsic record.
    type Call: Send + Sync;
    /// Event / log record.
    type Event: Send + Sync;
    type CallFilter: RecordFilter<Self::Call> + Send + Sync;
    type EventFilter: RecordFilter<Self::Event> + Send + Sync;

    /// The chain family this wrapper projects.
    const FAMILY: ChainFamily;

    /// The raw block snapshot.
    fn block(&self) -> &Self::Block;

    /// Block height.
    fn block_height(&self) -> u64;

    /// Block hash.
    fn hash(&self) -> &str;

    /// Runtime spec version, for families that version their state schema.
    fn spec_version(&self) -> Option<u32> {
        None
    }

    /// Block scalars handed to record filters.
    fn context(&self) -> BlockContext<'_> {
        BlockContext {
            height: self.block_height(),
            hash: self.hash(),
            spec_version: self.spec_version(),
        }
    }

    /// Calls matching at least one filter, in block order.
    fn calls<'f>(
        &self,
        _filters: impl Into<FilterArg<'f, Self::CallFilter>>,
    ) -> Result<Vec<&Self::Call>, IndexerError>
    where
        Self::CallFilter: 'f,
    {
        Err(IndexerError::Unsupported {
            family: Self::FAMILY,
            accessor: "calls",
        })
    }

    /// Events matching at least one filter, in block order.
    fn events<'f>(
        &self,
        _filters: impl Into<FilterArg<'f, Self::EventFilter>>,
    ) -> Result<Vec<&Self::Event>, IndexerError>
    where
        Self::EventFilter: 'f,
    {
        Err(IndexerError::Unsupported {
            family: Self::FAMILY,
            accessor: "events",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NoFilter;

    struct Opaque;

    impl BlockWrapper for Opaque {
        type Block = ();
        type Call = ();
        type Event = ();
        type CallFilter = NoFilter;
        type EventFilter = NoFilter;

        const FAMILY: ChainFamily = ChainFamily::Algorand;

        fn block(&self) -> &() {
            &()
        }

        fn block_height(&self) -> u64 {
            7
        }

        fn hash(&self) -> &str {
            "0x07"
        }
    }

    #[test]
    fn default_accessors_report_unsupported() {
        let w = Opaque;
        let err = w.calls(FilterArg::<NoFilter>::All).unwrap_err();
        assert!(matches!(
            err,
            IndexerError::Unsupported { family: ChainFamily::Algorand, accessor: "calls" }
        ));
        assert!(w.events(FilterArg::<NoFilter>::All).unwrap_err().is_unsupported());
    }

    #[test]
    fn context_carries_scalars() {
        let ctx = Opaque.context();
        assert_eq!(ctx.height, 7);
        assert_eq!(ctx.hash, "0x07");
        assert_eq!(ctx.spec_version, None);
    }
}
