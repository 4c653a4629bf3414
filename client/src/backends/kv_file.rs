use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

use crate::bridge::{StorageBackend, StoredRecord};

/// Single JSON-map file — the simple key-value storage analog. Sometimes
/// cleared wholesale on reinstall, which is exactly why it sits low in the
/// bridge's priority order.
pub struct KvFileBackend {
    path: PathBuf,
}

impl KvFileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn load(&self) -> anyhow::Result<HashMap<String, StoredRecord>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, map: &HashMap<String, StoredRecord>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_vec(map)?).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StorageBackend for KvFileBackend {
    fn name(&self) -> &'static str {
        "kv-file"
    }

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()> {
        let mut map = self.load().await?;
        map.insert(key.to_owned(), record.clone());
        self.store(&map).await
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>> {
        Ok(self.load().await?.remove(key))
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.store(&map).await?;
        }
        Ok(())
    }
}
