//! blockmap-core: foundation for the chain-agnostic block mapping engine.
//!
//! # Architecture
//!
//! ```text
//! raw block ──► BlockWrapper (one impl per chain family)
//!                   ├── calls(filters)   ─┐
//!                   └── events(filters)  ─┤
//!                                         ▼
//!               HandlerRegistry ──► Block/Call/Event handlers ──► EntityStore::save
//! ```
//!
//! Chain families live in their own crates (`blockmap-substrate`,
//! `blockmap-avalanche`, `blockmap-algorand`); this crate only defines the
//! shared contract.

pub mod chain;
pub mod entity;
pub mod error;
pub mod filter;
pub mod handler;
pub mod manifest;
pub mod pipeline;
pub mod wrapper;

pub use chain::ChainFamily;
pub use entity::{Entity, EntityStore, EntityStoreExt};
pub use error::IndexerError;
pub use filter::{BlockContext, BlockFilter, FilterArg, NoFilter, RecordFilter, SpecVersionRange};
pub use handler::{
    BlockHandler, BlockReport, CallHandler, EventHandler, HandlerCatalog, HandlerRegistry,
};
pub use manifest::{DataSource, HandlerKind, MappingHandler, ProjectManifest};
pub use pipeline::Pipeline;
pub use wrapper::BlockWrapper;
