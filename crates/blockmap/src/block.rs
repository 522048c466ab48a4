//! A wrapped block of any supported chain family.

use serde_json::Value;

use blockmap_algorand::AlgorandBlockWrapper;
use blockmap_avalanche::AvalancheBlockWrapper;
use blockmap_core::{BlockWrapper, ChainFamily, IndexerError};
use blockmap_substrate::{SubstrateBlock, SubstrateBlockWrapper};

/// One block, wrapped by the wrapper of its chain family.
///
/// Use this where the family is only known at runtime (e.g. from a manifest
/// data source). Family-specific calls/events are reached by matching on the
/// variant.
#[derive(Debug, Clone)]
pub enum ChainBlock {
    Substrate(SubstrateBlockWrapper),
    Avalanche(AvalancheBlockWrapper),
    Algorand(AlgorandBlockWrapper),
}

impl ChainBlock {
    /// Decode raw block JSON as the given family and wrap it.
    pub fn from_json(family: ChainFamily, value: Value) -> Result<Self, IndexerError> {
        let block = match family {
            ChainFamily::Substrate => {
                let raw: SubstrateBlock = serde_json::from_value(value)
                    .map_err(|e| IndexerError::MalformedBlock(e.to_string()))?;
                Self::Substrate(SubstrateBlockWrapper::new(raw))
            }
            ChainFamily::Avalanche => Self::Avalanche(AvalancheBlockWrapper::from_json(value)?),
            ChainFamily::Algorand => Self::Algorand(AlgorandBlockWrapper::from_json(value)?),
        };
        tracing::debug!(
            family = %family,
            height = block.block_height(),
            hash = %block.hash(),
            "Block wrapped"
        );
        Ok(block)
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Self::Substrate(_) => SubstrateBlockWrapper::FAMILY,
            Self::Avalanche(_) => AvalancheBlockWrapper::FAMILY,
            Self::Algorand(_) => AlgorandBlockWrapper::FAMILY,
        }
    }

    pub fn block_height(&self) -> u64 {
        match self {
            Self::Substrate(w) => w.block_height(),
            Self::Avalanche(w) => w.block_height(),
            Self::Algorand(w) => w.block_height(),
        }
    }

    pub fn hash(&self) -> &str {
        match self {
            Self::Substrate(w) => w.hash(),
            Self::Avalanche(w) => w.hash(),
            Self::Algorand(w) => w.hash(),
        }
    }

    /// Runtime spec version; `None` for unversioned families.
    pub fn spec_version(&self) -> Option<u32> {
        match self {
            Self::Substrate(w) => w.spec_version(),
            Self::Avalanche(w) => w.spec_version(),
            Self::Algorand(w) => w.spec_version(),
        }
    }
}

impl From<SubstrateBlockWrapper> for ChainBlock {
    fn from(w: SubstrateBlockWrapper) -> Self {
        Self::Substrate(w)
    }
}

impl From<AvalancheBlockWrapper> for ChainBlock {
    fn from(w: AvalancheBlockWrapper) -> Self {
        Self::Avalanche(w)
    }
}

impl From<AlgorandBlockWrapper> for ChainBlock {
    fn from(w: AlgorandBlockWrapper) -> Self {
        Self::Algorand(w)
    }
}
