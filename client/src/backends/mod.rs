mod cookie_jar;
mod data_store;
mod kv_file;
mod response_cache;
mod session;

pub use cookie_jar::CookieJarBackend;
pub use data_store::DataStoreBackend;
pub use kv_file::KvFileBackend;
pub use response_cache::ResponseCacheBackend;
pub use session::SessionBackend;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bridge::StorageBackend;

/// Filesystem roots handed to the persistent backends.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    /// Durable application data.
    pub data_dir: PathBuf,
    /// Evictable cache area.
    pub cache_dir: PathBuf,
}

/// Probe each facility and assemble the available ones in read priority
/// order: data store, response cache, cookie jar, plain key-value file,
/// session memory. The session backend is always present.
pub fn detect_backends(paths: &StoragePaths) -> Vec<Arc<dyn StorageBackend>> {
    let mut backends: Vec<Arc<dyn StorageBackend>> = Vec::new();
    let data_ok = dir_writable(&paths.data_dir);
    if data_ok {
        backends.push(Arc::new(DataStoreBackend::new(paths.data_dir.join("kv"))));
    }
    if dir_writable(&paths.cache_dir) {
        backends.push(Arc::new(ResponseCacheBackend::new(
            paths.cache_dir.join("bridge"),
        )));
    }
    if data_ok {
        backends.push(Arc::new(CookieJarBackend::new(
            paths.data_dir.join("cookies.txt"),
            chrono::Duration::days(7),
        )));
        backends.push(Arc::new(KvFileBackend::new(
            paths.data_dir.join("local_storage.json"),
        )));
    }
    backends.push(Arc::new(SessionBackend::new()));
    backends
}

fn dir_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".probe");
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}
