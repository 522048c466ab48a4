//! blockmap: map raw blocks from heterogeneous chains into persisted
//! entities.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use blockmap::{avalanche_pipeline, AvalancheBlockWrapper, InMemoryEntityStore, ProjectManifest};
//!
//! # async fn example(raw: serde_json::Value) -> Result<(), blockmap::IndexerError> {
//! let manifest = ProjectManifest::load("project.yaml")?;
//! let store = Arc::new(InMemoryEntityStore::new());
//! let mut pipeline = avalanche_pipeline(&manifest, store.clone())?;
//!
//! let report = pipeline.process(&AvalancheBlockWrapper::from_json(raw)?).await?;
//! println!("{} transactions saved", report.calls);
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod pipeline;

pub use block::ChainBlock;
pub use pipeline::{avalanche_pipeline, pipeline};

pub use blockmap_core::{
    BlockContext, BlockFilter, BlockHandler, BlockReport, BlockWrapper, CallHandler, ChainFamily,
    Entity, EntityStore, EntityStoreExt, EventHandler, FilterArg, HandlerCatalog, HandlerKind,
    HandlerRegistry, IndexerError, NoFilter, Pipeline, ProjectManifest, RecordFilter,
    SpecVersionRange,
};

pub use blockmap_algorand::AlgorandBlockWrapper;
pub use blockmap_avalanche::{
    AvalancheBlockWrapper, AvalancheCallFilter, AvalancheEventFilter, AvalancheMappings,
};
pub use blockmap_storage::InMemoryEntityStore;
pub use blockmap_substrate::{SubqlCallFilter, SubqlEventFilter, SubstrateBlockWrapper};

#[cfg(feature = "sqlite")]
pub use blockmap_storage::SqliteEntityStore;

/// Per-family crates, for types not re-exported at the top level.
pub mod chains {
    pub use blockmap_algorand as algorand;
    pub use blockmap_avalanche as avalanche;
    pub use blockmap_substrate as substrate;
}
