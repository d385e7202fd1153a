use std::time::Instant;

use bytes::Bytes;
use http::HeaderMap;

/// One cached upstream response.
///
/// Never mutated after construction; a refresh installs a new entry. Readers
/// hold it through an `Arc`, so a replaced entry stays valid until the last
/// reader drops it.
#[derive(Debug)]
pub struct CacheEntry {
    body: Bytes,
    headers: HeaderMap,
    expires_at: Instant,
}

impl CacheEntry {
    pub fn new(body: Bytes, headers: HeaderMap, expires_at: Instant) -> Self {
        Self {
            body,
            headers,
            expires_at,
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Strictly before `expires_at`; an entry at its expiry instant is stale.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}
