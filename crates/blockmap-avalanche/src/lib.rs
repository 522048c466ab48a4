//! blockmap-avalanche: Avalanche C-Chain (EVM-style) blocks, transactions and
//! logs, their filters, and the mappings that persist them.

pub mod filter;
pub mod mapping;
pub mod signature;
pub mod types;
pub mod wrapper;

pub use filter::{AvalancheCallFilter, AvalancheEventFilter};
pub use mapping::{
    handle_block, handle_call, handle_event, AvalancheBlockEntity, AvalancheEventEntity,
    AvalancheMappings, AvalancheTransactionEntity,
};
pub use types::{AvalancheBlock, AvalancheEvent, AvalancheTransaction};
pub use wrapper::AvalancheBlockWrapper;
