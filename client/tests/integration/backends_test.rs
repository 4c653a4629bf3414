use chrono::Duration;
use serde_json::json;
use tempfile::TempDir;

use clinpush_client::backends::{
    CookieJarBackend, DataStoreBackend, KvFileBackend, ResponseCacheBackend, StoragePaths,
    detect_backends,
};
use clinpush_client::bridge::{StorageBackend, StoredRecord};

#[tokio::test]
async fn data_store_reads_are_non_destructive() {
    let dir = TempDir::new().unwrap();
    let backend = DataStoreBackend::new(dir.path().join("kv"));

    backend
        .write("install_code", &StoredRecord::new(json!({ "code": "abc" })))
        .await
        .unwrap();

    assert!(backend.read("install_code").await.unwrap().is_some());
    assert!(
        backend.read("install_code").await.unwrap().is_some(),
        "second read should still hit"
    );
}

#[tokio::test]
async fn response_cache_consumes_on_read() {
    let dir = TempDir::new().unwrap();
    let backend = ResponseCacheBackend::new(dir.path().join("bridge"));

    backend
        .write("install_code", &StoredRecord::new(json!({ "code": "abc" })))
        .await
        .unwrap();

    assert!(backend.read("install_code").await.unwrap().is_some());
    assert!(
        backend.read("install_code").await.unwrap().is_none(),
        "cache entry is a one-shot handoff"
    );
}

#[tokio::test]
async fn cookie_jar_entries_expire() {
    let dir = TempDir::new().unwrap();
    let jar = CookieJarBackend::new(dir.path().join("cookies.txt"), Duration::seconds(-1));

    jar.write("install_code", &StoredRecord::new(json!({ "code": "abc" })))
        .await
        .unwrap();

    assert!(
        jar.read("install_code").await.unwrap().is_none(),
        "already-expired entry must not be served"
    );
}

#[tokio::test]
async fn cookie_jar_keeps_unexpired_entries_per_key() {
    let dir = TempDir::new().unwrap();
    let jar = CookieJarBackend::new(dir.path().join("cookies.txt"), Duration::minutes(30));

    jar.write("a", &StoredRecord::new(json!(1))).await.unwrap();
    jar.write("b", &StoredRecord::new(json!(2))).await.unwrap();
    jar.clear("a").await.unwrap();

    assert!(jar.read("a").await.unwrap().is_none());
    assert_eq!(jar.read("b").await.unwrap().unwrap().value, json!(2));
}

#[tokio::test]
async fn kv_file_holds_multiple_keys() {
    let dir = TempDir::new().unwrap();
    let backend = KvFileBackend::new(dir.path().join("local_storage.json"));

    backend.write("a", &StoredRecord::new(json!(1))).await.unwrap();
    backend.write("b", &StoredRecord::new(json!(2))).await.unwrap();

    assert_eq!(backend.read("a").await.unwrap().unwrap().value, json!(1));
    assert_eq!(backend.read("b").await.unwrap().unwrap().value, json!(2));

    backend.clear("a").await.unwrap();
    assert!(backend.read("a").await.unwrap().is_none());
    assert!(backend.read("b").await.unwrap().is_some());
}

#[tokio::test]
async fn detect_backends_includes_session_fallback() {
    let dir = TempDir::new().unwrap();
    let paths = StoragePaths {
        data_dir: dir.path().join("data"),
        cache_dir: dir.path().join("cache"),
    };
    let backends = detect_backends(&paths);

    // data store, response cache, cookie jar, kv file, session
    assert_eq!(backends.len(), 5);
    assert_eq!(backends.last().unwrap().name(), "session");
}

#[tokio::test]
async fn detect_backends_degrades_without_writable_dirs() {
    let dir = TempDir::new().unwrap();
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"not a directory").unwrap();

    let paths = StoragePaths {
        // a file where a directory is expected makes create_dir_all fail
        data_dir: blocked.join("data"),
        cache_dir: blocked.join("cache"),
    };
    let backends = detect_backends(&paths);

    assert_eq!(backends.len(), 1, "only the session backend survives");
    assert_eq!(backends[0].name(), "session");
}
