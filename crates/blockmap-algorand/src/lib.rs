//! blockmap-algorand: Algorand blocks as opaque JSON records.
//!
//! Algorand transactions carry no module/method or log structure that the
//! declarative filters can address, so [`AlgorandBlockWrapper`] keeps the
//! default `calls`/`events` accessors, which report
//! [`IndexerError::Unsupported`](blockmap_core::IndexerError::Unsupported).
//! Raw transactions remain reachable through
//! [`AlgorandBlockWrapper::transactions`].

pub mod wrapper;

pub use wrapper::{AlgorandBlock, AlgorandBlockWrapper, AlgorandEvent, AlgorandTransaction};
