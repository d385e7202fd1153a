use std::{fmt, future::Future, sync::Arc};

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use oidcx_proxy::{FetchedResponse, clone_headers};
use tracing::{debug, warn};

use crate::{
    clock::{Clock, SystemClock},
    entry::CacheEntry,
    policy::CachePolicy,
    store::MemoryCacheStore,
};

/// How a response was produced. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Replayed from a live entry; no upstream call.
    Hit,
    /// Fetched upstream and installed.
    Miss,
    /// Fetched upstream and not installed (passthrough mode or non-2xx).
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the handler writes back to the caller.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub cache_status: CacheStatus,
}

impl ServedResponse {
    /// Cache hits are always replayed as `200 OK`.
    fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            status: StatusCode::OK,
            headers: clone_headers(entry.headers()),
            body: entry.body().clone(),
            cache_status: CacheStatus::Hit,
        }
    }

    fn from_fetched(fetched: FetchedResponse, cache_status: CacheStatus) -> Self {
        Self {
            status: fetched.status,
            headers: fetched.headers,
            body: fetched.body,
            cache_status,
        }
    }
}

/// TTL cache in front of the fetcher.
///
/// Hits never touch the network. Misses and expired entries call the supplied
/// fetch outside the lock; concurrent misses for one key may each go upstream
/// and the last install wins.
pub struct CacheManager {
    store: MemoryCacheStore,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: MemoryCacheStore::new(),
            policy,
            clock,
        }
    }

    /// Snapshot lookup, fresh or not. Empty keys are never stored.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        if key.is_empty() {
            return None;
        }
        self.store.get(key)
    }

    /// Install `entry` for `key`, replacing whatever was there.
    pub fn put_if_fetched(&self, key: &str, entry: CacheEntry) {
        if key.is_empty() {
            warn!(target: "oidcx::cache", "Refusing to cache under an empty key");
            return;
        }
        let replaced = self.store.insert(key.to_string(), Arc::new(entry));
        debug!(
            target: "oidcx::cache",
            cache_key = %key,
            replaced = replaced.is_some(),
            "Installed cache entry"
        );
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Serve `key` from cache, or call `fetch` and cache its result.
    ///
    /// A failed fetch leaves the existing entry (stale or not) untouched and
    /// the error goes straight back to the caller.
    pub async fn resolve<F, Fut, E>(&self, key: &str, fetch: F) -> Result<ServedResponse, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedResponse, E>>,
    {
        if self.policy.is_enabled() {
            if let Some(entry) = self.get(key) {
                if entry.is_fresh(self.clock.now()) {
                    debug!(target: "oidcx::cache", cache_key = %key, "Cache hit");
                    return Ok(ServedResponse::from_entry(&entry));
                }
                debug!(target: "oidcx::cache", cache_key = %key, "Cache entry expired");
            } else {
                debug!(target: "oidcx::cache", cache_key = %key, "Cache miss");
            }
        }

        let fetched = fetch().await?;

        if !self.policy.is_cacheable(fetched.status) {
            if self.policy.is_enabled() {
                debug!(
                    target: "oidcx::cache",
                    cache_key = %key,
                    status = fetched.status.as_u16(),
                    "Upstream status not cacheable; forwarding only"
                );
            }
            return Ok(ServedResponse::from_fetched(fetched, CacheStatus::Bypass));
        }

        let entry = CacheEntry::new(
            fetched.body.clone(),
            clone_headers(&fetched.headers),
            self.policy.expires_at(self.clock.now()),
        );
        self.put_if_fetched(key, entry);

        Ok(ServedResponse::from_fetched(fetched, CacheStatus::Miss))
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("policy", &self.policy)
            .field("entries", &self.store.len())
            .finish_non_exhaustive()
    }
}
