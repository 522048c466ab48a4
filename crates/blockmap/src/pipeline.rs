//! Manifest-driven pipeline construction.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use blockmap_avalanche::{AvalancheBlockWrapper, AvalancheMappings};
use blockmap_core::{
    BlockWrapper, EntityStore, HandlerCatalog, HandlerRegistry, IndexerError, Pipeline,
    ProjectManifest,
};

/// Build a pipeline from the manifest's first data source for `W`'s family,
/// resolving handler names through `catalog`.
pub fn pipeline<W>(
    manifest: &ProjectManifest,
    catalog: &HandlerCatalog<W>,
    store: Arc<dyn EntityStore>,
) -> Result<Pipeline<W>, IndexerError>
where
    W: BlockWrapper,
    W::CallFilter: DeserializeOwned,
    W::EventFilter: DeserializeOwned,
{
    let source = manifest.data_source(W::FAMILY).ok_or_else(|| {
        IndexerError::Manifest(format!(
            "project '{}' has no {} data source",
            manifest.name,
            W::FAMILY
        ))
    })?;
    let registry = HandlerRegistry::from_data_source(source, catalog)?;
    tracing::info!(
        project = %manifest.name,
        family = %W::FAMILY,
        start_block = source.start_block,
        handlers = source.mapping.handlers.len(),
        "Pipeline built"
    );
    Ok(Pipeline::new(registry, store))
}

/// Pipeline running the Avalanche block/call/event mappings
/// (`handleBlock`, `handleCall`, `handleEvent`) as the manifest declares them.
pub fn avalanche_pipeline(
    manifest: &ProjectManifest,
    store: Arc<dyn EntityStore>,
) -> Result<Pipeline<AvalancheBlockWrapper>, IndexerError> {
    pipeline(manifest, &AvalancheMappings::catalog(), store)
}
