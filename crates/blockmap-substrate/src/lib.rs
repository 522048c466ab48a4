//! blockmap-substrate: account-based chains with extrinsics, events and a
//! runtime spec version.

pub mod filter;
pub mod types;
pub mod wrapper;

pub use filter::{SubqlCallFilter, SubqlEventFilter};
pub use types::{SubstrateBlock, SubstrateEvent, SubstrateExtrinsic};
pub use wrapper::SubstrateBlockWrapper;
