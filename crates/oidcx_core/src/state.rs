use oidcx_cache::{CacheManager, CachePolicy};
use oidcx_config::OidcxConfig;
use oidcx_proxy::{Fetcher, UpstreamClient};

use crate::worker::RouteTable;

/// Everything a request handler needs, shared behind an `Arc`.
#[derive(Debug)]
pub struct AppState<C> {
    pub routes: RouteTable,
    pub cache: CacheManager,
    pub fetcher: Fetcher<C>,
}

impl<C: UpstreamClient> AppState<C> {
    pub fn new(cfg: &OidcxConfig, fetcher: Fetcher<C>) -> Self {
        Self::with_cache(
            RouteTable::new(cfg.upstream.base_url()),
            CacheManager::new(CachePolicy::from_config(&cfg.cache)),
            fetcher,
        )
    }

    /// Explicit parts; tests use this to inject a cache with a manual clock.
    pub fn with_cache(routes: RouteTable, cache: CacheManager, fetcher: Fetcher<C>) -> Self {
        Self {
            routes,
            cache,
            fetcher,
        }
    }
}
