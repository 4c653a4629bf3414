use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tokio::fs;

use crate::bridge::{StorageBackend, StoredRecord};

/// Single-file jar of TTL-stamped entries, one per line
/// (`expires<TAB>key<TAB>record-json`). Expired entries are ignored on read
/// and purged on write.
pub struct CookieJarBackend {
    path: PathBuf,
    ttl: Duration,
}

impl CookieJarBackend {
    pub fn new(path: PathBuf, ttl: Duration) -> Self {
        Self { path, ttl }
    }

    async fn load(&self) -> anyhow::Result<Vec<(DateTime<Utc>, String, StoredRecord)>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        for line in text.lines() {
            let mut parts = line.splitn(3, '\t');
            let (Some(expires), Some(key), Some(json)) =
                (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            let Ok(expires) = expires.parse::<DateTime<Utc>>() else {
                continue;
            };
            let Ok(record) = serde_json::from_str::<StoredRecord>(json) else {
                continue;
            };
            entries.push((expires, key.to_owned(), record));
        }
        Ok(entries)
    }

    async fn store(
        &self,
        entries: &[(DateTime<Utc>, String, StoredRecord)],
    ) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut out = String::new();
        for (expires, key, record) in entries {
            out.push_str(&expires.to_rfc3339());
            out.push('\t');
            out.push_str(key);
            out.push('\t');
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        fs::write(&self.path, out).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StorageBackend for CookieJarBackend {
    fn name(&self) -> &'static str {
        "cookie-jar"
    }

    async fn write(&self, key: &str, record: &StoredRecord) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut entries = self.load().await?;
        entries.retain(|(expires, k, _)| k != key && *expires > now);
        entries.push((now + self.ttl, key.to_owned(), record.clone()));
        self.store(&entries).await
    }

    async fn read(&self, key: &str) -> anyhow::Result<Option<StoredRecord>> {
        let now = Utc::now();
        let entries = self.load().await?;
        Ok(entries
            .into_iter()
            .find(|(expires, k, _)| k == key && *expires > now)
            .map(|(_, _, record)| record))
    }

    async fn clear(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.load().await?;
        entries.retain(|(_, k, _)| k != key);
        self.store(&entries).await
    }
}
