use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

use crate::bridge::{StorageBackend, StoredRecord};

/// Record files in the evictable cache area. Reads consume the entry — the
/// cache is a one-shot handoff, not a store of record.
pub struct ResponseCacheBackend {
    dir: PathBuf,
}

impl ResponseCacheBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl StorageBackend for ResponseCacheBackend {
    fn name(&self) -> &'static str {
        "response-cache"
    }

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(record)?;
        fs::write(self.path_for(key), bytes).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                let _ = fs::remove_file(&path).await;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
