//! End-to-end migration tests
//!
//! Drive the whole pipeline the way the binary does: list the source,
//! load into the destination, clear the source — against both in-memory
//! endpoints and a live pair of HTTP stub stores.

use ferry_endpoint::HttpEndpoint;
use ferry_engine::{MigrationEngine, MigrationError, ResilientEndpoint, StagingDir};
use ferry_test_utils::{
    base_url, spawn_stub_server, EndpointOp, FlakyEndpoint, MemoryEndpoint, StubStore,
};
use std::sync::Arc;

fn record_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

#[tokio::test]
async fn full_migration_over_http() {
    let source_store = StubStore::new();
    source_store.insert("a.txt", b"alpha".to_vec());
    source_store.insert("b.txt", b"beta".to_vec());
    source_store.insert("c.txt", b"gamma".to_vec());
    let dest_store = StubStore::new();

    let source_addr = spawn_stub_server(source_store.clone());
    let dest_addr = spawn_stub_server(dest_store.clone());

    let source = ResilientEndpoint::new(
        Arc::new(HttpEndpoint::new(base_url(source_addr)).unwrap()),
        3,
    );
    let dest = ResilientEndpoint::new(
        Arc::new(HttpEndpoint::new(base_url(dest_addr)).unwrap()),
        3,
    );

    let base = tempfile::tempdir().unwrap();
    let staging = StagingDir::create(base.path()).unwrap();
    let engine = MigrationEngine::new(2, staging, source, dest);

    let names = engine.source().list().await.unwrap();
    assert_eq!(names, record_names(&["a.txt", "b.txt", "c.txt"]));

    engine.load(&names, 10).await.unwrap();
    engine.delete(engine.source(), &names).await.unwrap();
    engine.shutdown().unwrap();

    assert!(source_store.is_empty());
    assert_eq!(dest_store.len(), 3);
    assert_eq!(dest_store.content("a.txt").unwrap(), b"alpha".to_vec());
    assert_eq!(dest_store.content("b.txt").unwrap(), b"beta".to_vec());
    assert_eq!(dest_store.content("c.txt").unwrap(), b"gamma".to_vec());
}

#[tokio::test]
async fn conflicting_destination_record_is_replaced_over_http() {
    let source_store = StubStore::new();
    source_store.insert("a.txt", b"new bytes".to_vec());
    let dest_store = StubStore::new();
    dest_store.insert("a.txt", b"old bytes".to_vec());

    let source_addr = spawn_stub_server(source_store.clone());
    let dest_addr = spawn_stub_server(dest_store.clone());

    let base = tempfile::tempdir().unwrap();
    let staging = StagingDir::create(base.path()).unwrap();
    let engine = MigrationEngine::new(
        1,
        staging,
        ResilientEndpoint::new(
            Arc::new(HttpEndpoint::new(base_url(source_addr)).unwrap()),
            3,
        ),
        ResilientEndpoint::new(Arc::new(HttpEndpoint::new(base_url(dest_addr)).unwrap()), 3),
    );

    engine.load(&record_names(&["a.txt"]), 10).await.unwrap();

    assert_eq!(dest_store.len(), 1);
    assert_eq!(dest_store.content("a.txt").unwrap(), b"new bytes".to_vec());
}

#[tokio::test]
async fn flaky_source_recovers_within_budget() {
    let store = MemoryEndpoint::with_records([("a.txt", b"alpha".to_vec())]);
    let flaky_source = FlakyEndpoint::new(store).fail_times(EndpointOp::Fetch, 500, 3);

    let base = tempfile::tempdir().unwrap();
    let staging = StagingDir::create(base.path()).unwrap();
    let dest = MemoryEndpoint::new();
    let engine = MigrationEngine::new(
        1,
        staging,
        ResilientEndpoint::new(Arc::new(flaky_source), 5),
        ResilientEndpoint::new(Arc::new(dest.clone()), 5),
    );

    engine.load(&record_names(&["a.txt"]), 10).await.unwrap();
    assert_eq!(dest.content("a.txt").unwrap(), b"alpha".to_vec());
}

#[tokio::test]
async fn failed_load_leaves_source_untouched() {
    let source = MemoryEndpoint::with_records([("a.txt", b"alpha".to_vec())]);
    let dest = FlakyEndpoint::new(MemoryEndpoint::new()).fail_times(EndpointOp::Push, 500, 10);

    let base = tempfile::tempdir().unwrap();
    let staging = StagingDir::create(base.path()).unwrap();
    let engine = MigrationEngine::new(
        1,
        staging,
        ResilientEndpoint::new(Arc::new(source.clone()), 2),
        ResilientEndpoint::new(Arc::new(dest), 2),
    );

    let err = engine.load(&record_names(&["a.txt"]), 10).await.unwrap_err();
    assert!(matches!(err, MigrationError::Aggregate(_)));
    // the driver never issues the source delete after a failed load
    assert!(source.contains("a.txt"));
}
