//! Project manifest: which handlers run, on which records, from which block.
//!
//! ```yaml
//! specVersion: 0.2.0
//! name: avalanche-starter
//! network:
//!   endpoint: https://api.avax.network/ext/bc/C/rpc
//! dataSources:
//!   - kind: avalanche/Runtime
//!     startBlock: 1
//!     mapping:
//!       handlers:
//!         - handler: handleBlock
//!           kind: BlockHandler
//!         - handler: handleCall
//!           kind: CallHandler
//!           filter:
//!             function: "approve(address spender, uint256 amount)"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chain::ChainFamily;
use crate::error::IndexerError;

/// Which accessor feeds a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    #[serde(rename = "BlockHandler")]
    Block,
    #[serde(rename = "CallHandler")]
    Call,
    #[serde(rename = "EventHandler")]
    Event,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Block => write!(f, "BlockHandler"),
            Self::Call => write!(f, "CallHandler"),
            Self::Event => write!(f, "EventHandler"),
        }
    }
}

/// Top-level project manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub spec_version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    pub data_sources: Vec<DataSource>,
}

/// Network the project indexes. Only consumed by the data-fetching side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// One data source: a start block plus its handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Runtime kind, e.g. `"avalanche/Runtime"`.
    pub kind: String,
    /// First block processed by this data source (inclusive).
    #[serde(default = "default_start_block")]
    pub start_block: u64,
    pub mapping: Mapping,
}

impl DataSource {
    /// Chain family named by the `kind` prefix (`"avalanche/Runtime"`).
    pub fn family(&self) -> Option<ChainFamily> {
        self.kind.split('/').next()?.parse().ok()
    }
}

fn default_start_block() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub handlers: Vec<MappingHandler>,
}

/// A handler reference by name, with its kind and optional filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingHandler {
    pub handler: String,
    pub kind: HandlerKind,
    /// Raw filter (object or list of objects); decoded per chain family.
    /// Omitted means unfiltered; `[]` matches nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
}

impl ProjectManifest {
    /// Parse a YAML manifest.
    pub fn from_yaml(src: &str) -> Result<Self, IndexerError> {
        serde_yaml::from_str(src).map_err(|e| IndexerError::Manifest(e.to_string()))
    }

    /// Parse a JSON manifest.
    pub fn from_json(src: &str) -> Result<Self, IndexerError> {
        serde_json::from_str(src).map_err(|e| IndexerError::Manifest(e.to_string()))
    }

    /// Load a manifest from disk; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|e| IndexerError::Manifest(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&src),
            _ => Self::from_yaml(&src),
        }
    }

    /// First data source of the given chain family.
    pub fn data_source(&self, family: ChainFamily) -> Option<&DataSource> {
        self.data_sources.iter().find(|ds| ds.family() == Some(family))
    }
}
