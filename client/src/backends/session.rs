use std::collections::HashMap;
use std::sync::Mutex;

use crate::bridge::{StorageBackend, StoredRecord};

/// Process-lifetime map — the session-scoped storage analog. Always
/// available, gone with the process.
#[derive(Default)]
pub struct SessionBackend {
    map: Mutex<HashMap<String, StoredRecord>>,
}

impl SessionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StorageBackend for SessionBackend {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_owned(), record.clone());
        Ok(())
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}
