//! Chain family tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A class of blockchains sharing one raw data shape.
///
/// Every [`BlockWrapper`](crate::wrapper::BlockWrapper) implementation is
/// tagged with exactly one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// Account-based chains with extrinsics, events and a runtime spec version.
    Substrate,
    /// EVM-style chains with transactions and logs.
    Avalanche,
    /// Record-oriented chains with no filterable call/event structure.
    Algorand,
}

impl ChainFamily {
    /// Returns `true` if blocks of this family carry a runtime spec version.
    pub fn is_versioned(&self) -> bool {
        matches!(self, Self::Substrate)
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substrate => write!(f, "substrate"),
            Self::Avalanche => write!(f, "avalanche"),
            Self::Algorand => write!(f, "algorand"),
        }
    }
}

impl std::str::FromStr for ChainFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substrate" | "polkadot" => Ok(Self::Substrate),
            "avalanche" | "evm" => Ok(Self::Avalanche),
            "algorand" => Ok(Self::Algorand),
            other => Err(format!("unknown chain family '{other}'")),
        }
    }
}
