use std::sync::Arc;

use sitelink_companycam::CompanyCamApi;
use sitelink_core::cache::{CacheStamp, CacheTag, Lookup, QueryCache};
use sitelink_db::EntityStore;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Cached read results, stored as the JSON they are served as.
pub type ResponseCache = QueryCache<serde_json::Value>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Entity store (PostgreSQL or memory).
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<ServerConfig>,
    /// Present when a CompanyCam API token is configured.
    pub companycam: Option<Arc<CompanyCamApi>>,
    /// Read cache for thread, message and rolodex listings.
    pub cache: Arc<Mutex<ResponseCache>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        config: ServerConfig,
        companycam: Option<CompanyCamApi>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            companycam: companycam.map(Arc::new),
            cache: Arc::new(Mutex::new(ResponseCache::new())),
        }
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    /// Cached read for `key`, or a stamp of `tags` to take to the store.
    pub async fn cached(&self, key: &str, tags: &[CacheTag]) -> Lookup<serde_json::Value> {
        self.cache.lock().await.lookup(key, tags)
    }

    pub async fn cache_insert(&self, key: String, value: serde_json::Value, stamp: CacheStamp) {
        let stored = self.cache.lock().await.insert_stamped(key.as_str(), value, stamp);
        if !stored {
            tracing::debug!(key = %key, "Skipped caching a read that raced a write");
        }
    }

    /// Drop cached reads that depend on any of `tags`.
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        if tags.is_empty() {
            return;
        }
        let removed = self.cache.lock().await.invalidate(tags);
        tracing::debug!(tags = tags.len(), removed, "Cache invalidated");
    }
}
