#![allow(async_fn_in_trait)]

use std::collections::HashMap;
use std::sync::Mutex;

/// Cache version tag; activation drops stores carrying any other tag.
pub const CACHE_VERSION: &str = "clinpush-cache-v3";

/// Assets fetched eagerly at install time.
pub const ESSENTIAL_ASSETS: [&str; 5] = [
    "/",
    "/index.html",
    "/offline.html",
    "/icons/icon-512.png",
    "/manifest.webmanifest",
];

pub const OFFLINE_URL: &str = "/offline.html";

/// Request classes the cache distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Navigation,
    Static,
    Other,
}

/// Network side of the asset cache.
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Offline-capable asset cache: navigations network-first with offline
/// fallback, statics cache-first with population, versioned stores cleaned
/// on activation. Push-vendor traffic is never intercepted.
pub struct AssetCache<F: AssetFetcher> {
    fetcher: F,
    vendor_host: String,
    stores: Mutex<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl<F: AssetFetcher> AssetCache<F> {
    pub fn new(fetcher: F, vendor_host: impl Into<String>) -> Self {
        Self {
            fetcher,
            vendor_host: vendor_host.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Install step: precache the essential assets.
    pub async fn install(&self) -> anyhow::Result<()> {
        for url in ESSENTIAL_ASSETS {
            let body = self.fetcher.fetch(url).await?;
            self.put(url, body);
        }
        Ok(())
    }

    /// Activation step: drop stores left behind by other versions.
    pub fn activate(&self) {
        self.stores
            .lock()
            .unwrap()
            .retain(|version, _| version == CACHE_VERSION);
    }

    /// Route one request through the cache policy. `None` means the request
    /// is not intercepted (non-GET, push vendor, unclassified) or nothing
    /// could be served.
    pub async fn handle(&self, method: &str, url: &str, kind: RequestKind) -> Option<Vec<u8>> {
        if method != "GET" || url.contains(&self.vendor_host) {
            return None;
        }
        match kind {
            RequestKind::Navigation => self.network_first(url).await,
            RequestKind::Static => self.cache_first(url).await,
            RequestKind::Other => None,
        }
    }

    async fn network_first(&self, url: &str) -> Option<Vec<u8>> {
        match self.fetcher.fetch(url).await {
            Ok(body) => {
                self.put(url, body.clone());
                Some(body)
            }
            Err(_) => self.get(url).or_else(|| self.get(OFFLINE_URL)),
        }
    }

    async fn cache_first(&self, url: &str) -> Option<Vec<u8>> {
        if let Some(body) = self.get(url) {
            return Some(body);
        }
        match self.fetcher.fetch(url).await {
            Ok(body) => {
                self.put(url, body.clone());
                Some(body)
            }
            Err(_) => None,
        }
    }

    fn put(&self, url: &str, body: Vec<u8>) {
        self.stores
            .lock()
            .unwrap()
            .entry(CACHE_VERSION.to_owned())
            .or_default()
            .insert(url.to_owned(), body);
    }

    fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.stores
            .lock()
            .unwrap()
            .get(CACHE_VERSION)?
            .get(url)
            .cloned()
    }

    #[cfg(test)]
    fn seed_store(&self, version: &str, url: &str, body: Vec<u8>) {
        self.stores
            .lock()
            .unwrap()
            .entry(version.to_owned())
            .or_default()
            .insert(url.to_owned(), body);
    }

    #[cfg(test)]
    fn store_versions(&self) -> Vec<String> {
        self.stores.lock().unwrap().keys().cloned().collect()
    }
}
