use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;

use crate::bridge::{StorageBackend, StoredRecord};

/// Durable per-key record files in the application data directory — the
/// structured on-device database analog. Reads never consume.
pub struct DataStoreBackend {
    dir: PathBuf,
}

impl DataStoreBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait::async_trait]
impl StorageBackend for DataStoreBackend {
    fn name(&self) -> &'static str {
        "data-store"
    }

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(record)?;
        fs::write(self.path_for(key), bytes).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
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
