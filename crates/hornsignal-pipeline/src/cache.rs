//! Short-TTL in-process cache fronting the reader-facing API layer between
//! refresh cycles: the last clustered feed (15-30 min) and per-story
//! deep-synthesis results (60 min, produced by the out-of-scope synthesis
//! collaborator — this crate only holds the slot). Authoritative for reads
//! between cycles; the pipeline binary is the only writer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use hornsignal_common::Cluster;

const CLUSTERED_FEED_TTL: Duration = Duration::from_secs(20 * 60);
const SYNTHESIS_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic single-slot TTL cell, used for the clustered feed.
pub struct TtlCell<V> {
    ttl: Duration,
    inner: RwLock<Option<Entry<V>>>,
}

impl<V: Clone> TtlCell<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, inner: RwLock::new(None) }
    }

    pub async fn get(&self) -> Option<V> {
        let guard = self.inner.read().await;
        match &*guard {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, value: V) {
        let mut guard = self.inner.write().await;
        *guard = Some(Entry { value, expires_at: Instant::now() + self.ttl });
    }
}

/// Keyed TTL map, used for per-story synthesis results. Lazily evicts
/// expired entries on read rather than running a background sweep.
pub struct TtlMap<K, V> {
    ttl: Duration,
    inner: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: std::hash::Hash + Eq + Clone, V: Clone> TtlMap<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, inner: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.inner.read().await;
        match guard.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub async fn set(&self, key: K, value: V) {
        let mut guard = self.inner.write().await;
        guard.retain(|_, e| e.expires_at > Instant::now());
        guard.insert(key, Entry { value, expires_at: Instant::now() + self.ttl });
    }
}

/// The two cache tiers the API layer reads between pipeline cycles.
pub struct PipelineCache {
    pub clustered_feed: TtlCell<Vec<Cluster>>,
    pub story_synthesis: TtlMap<String, String>,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self {
            clustered_feed: TtlCell::new(CLUSTERED_FEED_TTL),
            story_synthesis: TtlMap::new(SYNTHESIS_TTL),
        }
    }
}
