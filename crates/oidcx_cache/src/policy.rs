use std::time::{Duration, Instant};

use http::StatusCode;
use oidcx_config::{CacheConfig, CacheMode};

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// What gets cached and for how long.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    ttl: Duration,
    mode: CacheMode,
}

impl CachePolicy {
    pub fn new(ttl: Duration, mode: CacheMode) -> Self {
        Self { ttl, mode }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self::new(cfg.ttl(), cfg.mode())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.mode == CacheMode::Cached && !self.ttl.is_zero()
    }

    /// Only successful upstream answers are kept. Errors from the API server
    /// are forwarded once and never replayed.
    pub fn is_cacheable(&self, status: StatusCode) -> bool {
        self.is_enabled() && status.is_success()
    }

    /// Saturates instead of panicking on huge TTLs.
    pub fn expires_at(&self, now: Instant) -> Instant {
        now.checked_add(self.ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }
}
