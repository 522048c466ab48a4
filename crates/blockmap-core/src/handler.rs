//! Block, call and event handler traits + registry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::EntityStore;
use crate::error::IndexerError;
use crate::filter::{decode_filters, BlockFilter, FilterArg};
use crate::manifest::{DataSource, HandlerKind};
use crate::wrapper::BlockWrapper;

/// Handler called once per block.
#[async_trait]
pub trait BlockHandler<W: BlockWrapper>: Send + Sync {
    async fn handle_block(&self, block: &W, store: &dyn EntityStore) -> Result<(), IndexerError>;
}

/// Handler called for each call that matches its filters.
#[async_trait]
pub trait CallHandler<W: BlockWrapper>: Send + Sync {
    async fn handle_call(&self, call: &W::Call, store: &dyn EntityStore)
        -> Result<(), IndexerError>;
}

/// Handler called for each event that matches its filters.
#[async_trait]
pub trait EventHandler<W: BlockWrapper>: Send + Sync {
    async fn handle_event(
        &self,
        event: &W::Event,
        store: &dyn EntityStore,
    ) -> Result<(), IndexerError>;
}

// ─── HandlerCatalog ──────────────────────────────────────────────────────────

/// A handler implementation of one of the three kinds.
pub enum NamedHandler<W: BlockWrapper> {
    Block(Arc<dyn BlockHandler<W>>),
    Call(Arc<dyn CallHandler<W>>),
    Event(Arc<dyn EventHandler<W>>),
}

impl<W: BlockWrapper> NamedHandler<W> {
    pub fn kind(&self) -> HandlerKind {
        match self {
            Self::Block(_) => HandlerKind::Block,
            Self::Call(_) => HandlerKind::Call,
            Self::Event(_) => HandlerKind::Event,
        }
    }
}

impl<W: BlockWrapper> Clone for NamedHandler<W> {
    fn clone(&self) -> Self {
        match self {
            Self::Block(h) => Self::Block(h.clone()),
            Self::Call(h) => Self::Call(h.clone()),
            Self::Event(h) => Self::Event(h.clone()),
        }
    }
}

/// Handler implementations addressable by the names a manifest uses.
pub struct HandlerCatalog<W: BlockWrapper> {
    handlers: HashMap<String, NamedHandler<W>>,
}

impl<W: BlockWrapper> HandlerCatalog<W> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn block(mut self, name: impl Into<String>, handler: Arc<dyn BlockHandler<W>>) -> Self {
        self.handlers.insert(name.into(), NamedHandler::Block(handler));
        self
    }

    pub fn call(mut self, name: impl Into<String>, handler: Arc<dyn CallHandler<W>>) -> Self {
        self.handlers.insert(name.into(), NamedHandler::Call(handler));
        self
    }

    pub fn event(mut self, name: impl Into<String>, handler: Arc<dyn EventHandler<W>>) -> Self {
        self.handlers.insert(name.into(), NamedHandler::Event(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<&NamedHandler<W>> {
        self.handlers.get(name)
    }
}

impl<W: BlockWrapper> Default for HandlerCatalog<W> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── HandlerRegistry ─────────────────────────────────────────────────────────

struct BlockEntry<W: BlockWrapper> {
    handler: Arc<dyn BlockHandler<W>>,
    filters: Option<Vec<BlockFilter>>,
}

struct CallEntry<W: BlockWrapper> {
    handler: Arc<dyn CallHandler<W>>,
    filters: Option<Vec<W::CallFilter>>,
}

struct EventEntry<W: BlockWrapper> {
    handler: Arc<dyn EventHandler<W>>,
    filters: Option<Vec<W::EventFilter>>,
}

/// Outcome of processing one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub height: u64,
    pub hash: String,
    /// `true` if the block was below the data source's start block.
    pub skipped: bool,
    /// Block handler invocations.
    pub blocks: usize,
    /// Call handler invocations.
    pub calls: usize,
    /// Event handler invocations.
    pub events: usize,
}

/// Registry of block + call + event handlers for one chain family.
///
/// Every handler carries an optional list of filters. `None` receives every
/// record; a list admits what any one of its filters admits, so an empty
/// list receives nothing.
pub struct HandlerRegistry<W: BlockWrapper> {
    start_block: u64,
    block_handlers: Vec<BlockEntry<W>>,
    call_handlers: Vec<CallEntry<W>>,
    event_handlers: Vec<EventEntry<W>>,
}

impl<W: BlockWrapper> HandlerRegistry<W> {
    pub fn new() -> Self {
        Self {
            start_block: 0,
            block_handlers: vec![],
            call_handlers: vec![],
            event_handlers: vec![],
        }
    }

    /// Build a registry from a manifest data source, resolving handler names
    /// through `catalog` and decoding each filter for this chain family.
    pub fn from_data_source(
        source: &DataSource,
        catalog: &HandlerCatalog<W>,
    ) -> Result<Self, IndexerError>
    where
        W::CallFilter: DeserializeOwned,
        W::EventFilter: DeserializeOwned,
    {
        let mut registry = Self::new().start_block(source.start_block);

        for entry in &source.mapping.handlers {
            let handler = catalog.get(&entry.handler).ok_or_else(|| IndexerError::Handler {
                handler: entry.handler.clone(),
                reason: "no handler registered under this name".into(),
            })?;
            if handler.kind() != entry.kind {
                return Err(IndexerError::Handler {
                    handler: entry.handler.clone(),
                    reason: format!("declared as {} but implemented as {}", entry.kind, handler.kind()),
                });
            }

            match handler.clone() {
                NamedHandler::Block(h) => {
                    registry.on_block(h, decode_filters(entry.filter.as_ref()));
                }
                NamedHandler::Call(h) => {
                    registry.on_call(h, decode_filters(entry.filter.as_ref()));
                }
                NamedHandler::Event(h) => {
                    registry.on_event(h, decode_filters(entry.filter.as_ref()));
                }
            }
        }
        Ok(registry)
    }

    /// Skip blocks below `height`.
    pub fn start_block(mut self, height: u64) -> Self {
        self.start_block = height;
        self
    }

    /// Register a block handler, optionally gated by block filters.
    pub fn on_block(
        &mut self,
        handler: Arc<dyn BlockHandler<W>>,
        filters: Option<Vec<BlockFilter>>,
    ) {
        self.block_handlers.push(BlockEntry { handler, filters });
    }

    /// Register a call handler. `None` receives every call.
    pub fn on_call(&mut self, handler: Arc<dyn CallHandler<W>>, filters: Option<Vec<W::CallFilter>>) {
        self.call_handlers.push(CallEntry { handler, filters });
    }

    /// Register an event handler. `None` receives every event.
    pub fn on_event(
        &mut self,
        handler: Arc<dyn EventHandler<W>>,
        filters: Option<Vec<W::EventFilter>>,
    ) {
        self.event_handlers.push(EventEntry { handler, filters });
    }

    /// Run every handler against one block.
    ///
    /// Block handlers run first, in registration order. Call and event
    /// dispatch then run concurrently with each other; within each, records
    /// are handled in block order. The first error aborts the block.
    pub async fn process(
        &self,
        block: &W,
        store: &dyn EntityStore,
    ) -> Result<BlockReport, IndexerError> {
        let mut report = BlockReport {
            height: block.block_height(),
            hash: block.hash().to_string(),
            ..Default::default()
        };

        if report.height < self.start_block {
            tracing::debug!(height = report.height, start = self.start_block, "Below start block");
            report.skipped = true;
            return Ok(report);
        }

        let ctx = block.context();
        for entry in &self.block_handlers {
            let admitted = entry
                .filters
                .as_ref()
                .map_or(true, |fs| fs.iter().any(|f| f.matches_block(&ctx)));
            if admitted {
                entry.handler.handle_block(block, store).await?;
                report.blocks += 1;
            }
        }

        let (calls, events) = futures::try_join!(
            self.dispatch_calls(block, store),
            self.dispatch_events(block, store)
        )?;
        report.calls = calls;
        report.events = events;

        tracing::info!(
            height = report.height,
            hash = %report.hash,
            blocks = report.blocks,
            calls = report.calls,
            events = report.events,
            "Block processed"
        );
        Ok(report)
    }

    async fn dispatch_calls(&self, block: &W, store: &dyn EntityStore) -> Result<usize, IndexerError> {
        let mut handled = 0;
        for entry in &self.call_handlers {
            let calls = match &entry.filters {
                None => block.calls(FilterArg::<W::CallFilter>::All)?,
                Some(filters) => block.calls(filters.as_slice())?,
            };
            for call in calls {
                entry.handler.handle_call(call, store).await?;
                handled += 1;
            }
        }
        Ok(handled)
    }

    async fn dispatch_events(&self, block: &W, store: &dyn EntityStore) -> Result<usize, IndexerError> {
        let mut handled = 0;
        for entry in &self.event_handlers {
            let events = match &entry.filters {
                None => block.events(FilterArg::<W::EventFilter>::All)?,
                Some(filters) => block.events(filters.as_slice())?,
            };
            for event in events {
                entry.handler.handle_event(event, store).await?;
                handled += 1;
            }
        }
        Ok(handled)
    }
}

impl<W: BlockWrapper> Default for HandlerRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
