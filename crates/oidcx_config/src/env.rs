//! Environment variable overrides.
//!
//! These names predate the config file and are what the deployment manifests
//! set, so they are applied on top of whatever `oidcx.toml` provided.

use crate::cache::ttl_in_range;
use crate::{CacheMode, OidcxConfig};

pub const ENV_CONFIG_PATH: &str = "OIDCX_CONFIG";
pub const ENV_TOKEN_PATH: &str = "TOKEN_PATH";
pub const ENV_CA_CERT_PATH: &str = "CA_CERT_PATH";
pub const ENV_CACHE_TTL_MINUTES: &str = "CACHE_TTL_MINUTES";
pub const ENV_CACHE_MODE: &str = "CACHE_MODE";
pub const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const ENV_UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";

impl OidcxConfig {
    /// Apply overrides from `lookup` (normally `std::env::var`).
    ///
    /// Empty values count as unset. Values that cannot be parsed leave the
    /// current setting in place and add a load warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_TOKEN_PATH) {
            self.upstream.token_path = path;
        }
        if let Some(path) = get(ENV_CA_CERT_PATH) {
            self.upstream.ca_cert_path = path;
        }
        if let Some(listen) = get(ENV_LISTEN_ADDR) {
            self.server.listen = listen;
        }
        if let Some(base) = get(ENV_UPSTREAM_BASE_URL) {
            self.upstream.base_url = base;
        }

        if let Some(raw) = get(ENV_CACHE_TTL_MINUTES) {
            match raw.trim().parse::<i64>() {
                Ok(minutes) if ttl_in_range(minutes) => self.cache.ttl_minutes = minutes,
                _ => self.load_warnings.push(format!(
                    "invalid {ENV_CACHE_TTL_MINUTES}='{raw}', using {} minutes",
                    self.cache.ttl().as_secs() / 60
                )),
            }
        }

        if let Some(raw) = get(ENV_CACHE_MODE) {
            match raw.parse::<CacheMode>() {
                Ok(mode) => self.cache.mode = mode,
                Err(e) => self
                    .load_warnings
                    .push(format!("invalid {ENV_CACHE_MODE}: {e}; keeping '{}'", self.cache.mode)),
            }
        }
    }
}
