//! Wire-level tests of the HTTP endpoint against a live stub store.

use ferry_endpoint::{HttpEndpoint, StorageEndpoint};
use ferry_test_utils::{base_url, spawn_stub_server, StubStore};

fn endpoint_over(store: &StubStore) -> HttpEndpoint {
    let addr = spawn_stub_server(store.clone());
    HttpEndpoint::new(base_url(addr)).unwrap()
}

#[tokio::test]
async fn list_returns_every_record_name() {
    let store = StubStore::new();
    store.insert("a.txt", b"alpha".to_vec());
    store.insert("b.txt", b"beta".to_vec());
    let endpoint = endpoint_over(&store);

    let names = endpoint.list().await.unwrap();
    assert_eq!(names, vec!["a.txt".to_owned(), "b.txt".to_owned()]);
}

#[tokio::test]
async fn fetch_writes_full_content() {
    let store = StubStore::new();
    store.insert("a.txt", b"alpha bytes".to_vec());
    let endpoint = endpoint_over(&store);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.txt");
    endpoint.fetch("a.txt", &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"alpha bytes".to_vec());
}

#[tokio::test]
async fn fetch_missing_record_is_not_found_and_leaves_no_file() {
    let store = StubStore::new();
    let endpoint = endpoint_over(&store);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("ghost.txt");
    let err = endpoint.fetch("ghost.txt", &dest).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!dest.exists());
}

#[tokio::test]
async fn push_stores_record_under_file_name() {
    let store = StubStore::new();
    let endpoint = endpoint_over(&store);

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("fresh.txt");
    std::fs::write(&local, b"payload").unwrap();

    endpoint.push(&local).await.unwrap();
    assert_eq!(store.content("fresh.txt").unwrap(), b"payload".to_vec());
}

#[tokio::test]
async fn push_existing_record_is_a_conflict() {
    let store = StubStore::new();
    store.insert("dup.txt", b"original".to_vec());
    let endpoint = endpoint_over(&store);

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("dup.txt");
    std::fs::write(&local, b"replacement").unwrap();

    let err = endpoint.push(&local).await.unwrap_err();
    assert!(err.is_conflict());
    // the original record is untouched
    assert_eq!(store.content("dup.txt").unwrap(), b"original".to_vec());
}

#[tokio::test]
async fn remove_deletes_and_reports_missing() {
    let store = StubStore::new();
    store.insert("a.txt", b"alpha".to_vec());
    let endpoint = endpoint_over(&store);

    endpoint.remove("a.txt").await.unwrap();
    assert!(store.is_empty());

    let err = endpoint.remove("a.txt").await.unwrap_err();
    assert!(err.is_not_found());
}
