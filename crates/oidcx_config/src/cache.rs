use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;

/// TTL used when none is configured, or the configured one is out of range.
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 2;

/// Largest accepted TTL (one week). Longer values fall back to the default.
pub const MAX_CACHE_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Whether upstream responses are kept between requests.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Serve from the TTL cache, refreshing lazily on expiry.
    #[default]
    Cached,
    /// Every request goes upstream; nothing is stored.
    Passthrough,
}

impl FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cached" => Ok(CacheMode::Cached),
            "passthrough" => Ok(CacheMode::Passthrough),
            other => Err(format!("unknown cache mode '{other}'")),
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Cached => f.write_str("cached"),
            CacheMode::Passthrough => f.write_str("passthrough"),
        }
    }
}

// =======================================================
// CACHE CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_minutes: i64,
    pub mode: CacheMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            mode: CacheMode::Cached,
        }
    }
}

impl CacheConfig {
    /// Global TTL applied to every cached key.
    pub fn ttl(&self) -> Duration {
        let minutes = if ttl_in_range(self.ttl_minutes) {
            self.ttl_minutes
        } else {
            DEFAULT_CACHE_TTL_MINUTES
        };
        Duration::from_secs(minutes.unsigned_abs().saturating_mul(60))
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Returns a warning when the configured TTL had to be replaced.
    pub(crate) fn apply_defaults_from(&mut self, defaults: &CacheConfig) -> Option<String> {
        if ttl_in_range(self.ttl_minutes) {
            return None;
        }
        let bad = self.ttl_minutes;
        self.ttl_minutes = defaults.ttl_minutes;
        Some(format!(
            "cache.ttl_minutes = {bad} is outside 1..={MAX_CACHE_TTL_MINUTES}; using default {} minutes",
            defaults.ttl_minutes
        ))
    }
}

pub(crate) fn ttl_in_range(minutes: i64) -> bool {
    (1..=MAX_CACHE_TTL_MINUTES).contains(&minutes)
}
