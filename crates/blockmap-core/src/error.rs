//! Error types for the blockmap pipeline.

use thiserror::Error;

use crate::chain::ChainFamily;

/// Errors that can occur while wrapping, filtering, or mapping blocks.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("`{accessor}` is not supported for the {family} chain family")]
    Unsupported {
        family: ChainFamily,
        accessor: &'static str,
    },

    #[error("Persistence error saving {entity} '{id}': {reason}")]
    Persistence {
        entity: String,
        id: String,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid spec version range: min {min} > max {max}")]
    InvalidSpecVersionRange { min: u32, max: u32 },

    #[error("Handler error in '{handler}': {reason}")]
    Handler { handler: String, reason: String },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Malformed block: {0}")]
    MalformedBlock(String),

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    /// Returns `true` if the chain family lacks the requested accessor.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Returns `true` if the persistence collaborator rejected a save or load.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    pub(crate) fn persistence(entity: &str, id: &str, reason: impl ToString) -> Self {
        Self::Persistence {
            entity: entity.to_string(),
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}
