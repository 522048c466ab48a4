//! Manifest → pipeline → entity store, over a recorded C-Chain block.

use std::path::PathBuf;
use std::sync::Arc;

use blockmap::chains::avalanche::{AvalancheEventEntity, AvalancheTransactionEntity};
use blockmap::{
    avalanche_pipeline, AvalancheBlockWrapper, AvalancheCallFilter, BlockWrapper, ChainBlock,
    ChainFamily, EntityStore, EntityStoreExt, FilterArg, InMemoryEntityStore, IndexerError,
    ProjectManifest,
};

const BLOCK_HASH: &str = "0xb1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn raw_block() -> serde_json::Value {
    let src = std::fs::read_to_string(fixture("avalanche_block.json")).unwrap();
    serde_json::from_str(&src).unwrap()
}

fn manifest() -> ProjectManifest {
    ProjectManifest::load(fixture("avalanche_project.yaml")).unwrap()
}

#[tokio::test]
async fn manifest_filters_select_transfer_records() {
    let store = Arc::new(InMemoryEntityStore::new());
    let mut pipeline = avalanche_pipeline(&manifest(), store.clone()).unwrap();

    let block = AvalancheBlockWrapper::from_json(raw_block()).unwrap();
    let report = pipeline.process(&block).await.unwrap();

    assert_eq!(report.height, 2_000_000);
    assert!(!report.skipped);
    assert_eq!(report.blocks, 1);
    // approve() and the contract creation are filtered out
    assert_eq!(report.calls, 1);
    // the Approval log is filtered out
    assert_eq!(report.events, 1);

    let tx: AvalancheTransactionEntity = store
        .load_entity(&format!("{BLOCK_HASH}-0x7001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.block_id, BLOCK_HASH);
    assert_eq!(tx.from, "0x1111111111111111111111111111111111111111");

    let log: AvalancheEventEntity = store
        .load_entity(&format!("{BLOCK_HASH}-0x0"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.transaction_hash, "0x7001");
    assert_eq!(log.topics.len(), 3);

    assert!(store.load("AvalancheBlock", BLOCK_HASH).await.unwrap().is_some());
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn reprocessing_a_block_leaves_store_unchanged() {
    let store = Arc::new(InMemoryEntityStore::new());
    let mut pipeline = avalanche_pipeline(&manifest(), store.clone()).unwrap();
    let block = AvalancheBlockWrapper::from_json(raw_block()).unwrap();

    pipeline.process(&block).await.unwrap();
    let first = store.snapshot();
    pipeline.process(&block).await.unwrap();

    assert_eq!(store.snapshot(), first);
    assert_eq!(store.save_count(), 6);
}

#[tokio::test]
async fn blocks_before_start_block_are_skipped() {
    let store = Arc::new(InMemoryEntityStore::new());
    let mut pipeline = avalanche_pipeline(&manifest(), store.clone()).unwrap();

    let mut raw = raw_block();
    raw["number"] = serde_json::json!("0x10");
    let block = AvalancheBlockWrapper::from_json(raw).unwrap();

    let report = pipeline.process(&block).await.unwrap();
    assert!(report.skipped);
    assert!(store.is_empty());
}

#[tokio::test]
async fn unknown_handler_name_is_rejected() {
    let mut manifest = manifest();
    manifest.data_sources[0].mapping.handlers[1].handler = "handleSwap".into();

    let store = Arc::new(InMemoryEntityStore::new());
    let err = avalanche_pipeline(&manifest, store).err().unwrap();
    assert!(matches!(err, IndexerError::Handler { ref handler, .. } if handler == "handleSwap"));
}

#[tokio::test]
async fn missing_family_data_source_is_manifest_error() {
    let mut manifest = manifest();
    manifest.data_sources[0].kind = "substrate/Runtime".into();

    let store = Arc::new(InMemoryEntityStore::new());
    let err = avalanche_pipeline(&manifest, store).err().unwrap();
    assert!(matches!(err, IndexerError::Manifest(_)));
}

#[test]
fn wrapper_queries_over_fixture() {
    let block = AvalancheBlockWrapper::from_json(raw_block()).unwrap();

    let all = block.calls(FilterArg::<AvalancheCallFilter>::All).unwrap();
    assert_eq!(all.len(), 3);

    let either = [
        AvalancheCallFilter::sender("0x1111111111111111111111111111111111111111"),
        AvalancheCallFilter::sender("0x5555555555555555555555555555555555555555"),
    ];
    let hashes: Vec<_> = block
        .calls(&either[..])
        .unwrap()
        .iter()
        .map(|tx| tx.hash.as_str())
        .collect();
    assert_eq!(hashes, vec!["0x7001", "0x7003"]);

    let projected = block.get_transactions(Some(&["hash", "to"][..]));
    assert_eq!(projected[2]["to"], serde_json::Value::Null);
    assert_eq!(block.get(&["gasUsed", "bogus"]).len(), 1);
}

#[test]
fn chain_block_from_fixture() {
    let block = ChainBlock::from_json(ChainFamily::Avalanche, raw_block()).unwrap();
    assert_eq!(block.family(), ChainFamily::Avalanche);
    assert_eq!(block.block_height(), 2_000_000);
    assert_eq!(block.hash(), BLOCK_HASH);
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_store_behind_pipeline() {
    let store = Arc::new(blockmap::SqliteEntityStore::in_memory().await.unwrap());
    let mut pipeline = avalanche_pipeline(&manifest(), store.clone()).unwrap();
    let block = AvalancheBlockWrapper::from_json(raw_block()).unwrap();

    pipeline.process(&block).await.unwrap();
    pipeline.process(&block).await.unwrap();
    assert_eq!(store.count("AvalancheTransaction").await.unwrap(), 1);
}
