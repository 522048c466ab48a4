//! Sequential block pipeline.
//!
//! Blocks are processed strictly one at a time: every handler for height `N`
//! (and every save it issues) completes before height `N + 1` starts. Within a
//! block, call and event dispatch may overlap (see
//! [`HandlerRegistry::process`]).

use std::sync::Arc;

use crate::entity::EntityStore;
use crate::error::IndexerError;
use crate::handler::{BlockReport, HandlerRegistry};
use crate::wrapper::BlockWrapper;

/// Drives a [`HandlerRegistry`] over a sequence of wrapped blocks.
pub struct Pipeline<W: BlockWrapper> {
    registry: HandlerRegistry<W>,
    store: Arc<dyn EntityStore>,
    last_height: Option<u64>,
}

impl<W: BlockWrapper> Pipeline<W> {
    pub fn new(registry: HandlerRegistry<W>, store: Arc<dyn EntityStore>) -> Self {
        Self {
            registry,
            store,
            last_height: None,
        }
    }

    /// Height of the last block processed without error.
    pub fn last_height(&self) -> Option<u64> {
        self.last_height
    }

    /// The store handlers save into.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Process one block. Errors are returned as-is; retrying is up to the caller.
    pub async fn process(&mut self, block: &W) -> Result<BlockReport, IndexerError> {
        if let Some(last) = self.last_height {
            if block.block_height() <= last {
                tracing::debug!(
                    height = block.block_height(),
                    last,
                    "Reprocessing block at or below last height"
                );
            }
        }
        let report = self.registry.process(block, self.store.as_ref()).await?;
        self.last_height = Some(report.height);
        Ok(report)
    }

    /// Process blocks in iteration order, stopping at the first error.
    pub async fn run<I>(&mut self, blocks: I) -> Result<Vec<BlockReport>, IndexerError>
    where
        I: IntoIterator<Item = W>,
    {
        let mut reports = Vec::new();
        for block in blocks {
            reports.push(self.process(&block).await?);
        }
        tracing::info!(
            blocks = reports.len(),
            last = ?self.last_height,
            "Pipeline run complete"
        );
        Ok(reports)
    }
}
