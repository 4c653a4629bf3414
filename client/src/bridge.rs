use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value plus its write timestamp, the shape every backend persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub value: Value,
    pub ts: DateTime<Utc>,
}

impl StoredRecord {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            ts: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.ts
    }
}

/// One persistence facility. Implementations are allowed to fail; the bridge
/// swallows every backend error.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()>;

    /// Read the record for `key`. Some backends consume the entry on read.
    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>>;

    async fn clear(&self, key: &str) -> anyhow::Result<()>;
}

/// Redundant key-value persistence over every available backend.
///
/// Installation contexts silently disable or partition individual storage
/// facilities; writing everywhere and reading in a fixed priority order
/// compensates without per-platform branches.
#[derive(Clone)]
pub struct Bridge {
    backends: Arc<Vec<Arc<dyn StorageBackend>>>,
}

impl Bridge {
    /// `backends` in read priority order, highest first.
    pub fn new(backends: Vec<Arc<dyn StorageBackend>>) -> Self {
        Self {
            backends: Arc::new(backends),
        }
    }

    /// Write to every backend concurrently. Failures are logged and swallowed.
    pub async fn write(&self, key: &str, value: Value) {
        let record = StoredRecord::new(value);
        let writes = self.backends.iter().map(|backend| {
            let record = record.clone();
            async move {
                if let Err(e) = backend.write(key, &record).await {
                    tracing::debug!(backend = backend.name(), key, error = %e, "bridge write failed");
                }
            }
        });
        futures::future::join_all(writes).await;
    }

    /// First hit no older than `max_age`, walking backends in priority order.
    pub async fn read(&self, key: &str, max_age: Duration) -> Option<StoredRecord> {
        for backend in self.backends.iter() {
            match backend.read(key).await {
                Ok(Some(record)) if record.age() <= max_age => return Some(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(backend = backend.name(), key, error = %e, "bridge read failed");
                }
            }
        }
        None
    }

    /// Best-effort clear on every backend.
    pub async fn clear(&self, key: &str) {
        for backend in self.backends.iter() {
            if let Err(e) = backend.clear(key).await {
                tracing::debug!(backend = backend.name(), key, error = %e, "bridge clear failed");
            }
        }
    }
}
