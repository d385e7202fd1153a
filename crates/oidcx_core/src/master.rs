use std::{future::Future, sync::Arc};

use oidcx_config::OidcxConfig;
use oidcx_proxy::UpstreamClient;
use tokio::{
    net::TcpListener,
    sync::{Semaphore, watch},
    time::timeout,
};
use tracing::{info, instrument, warn};

use crate::AppState;

mod accept;
mod shutdown;

use accept::{accept_with_permit, bind_listener, spawn_worker};
pub use shutdown::shutdown_signal;

/// Owns the listening socket and hands each connection to a worker task.
pub struct Master<C> {
    cfg: Arc<OidcxConfig>,
    state: Arc<AppState<C>>,
}

impl<C: UpstreamClient + 'static> Master<C> {
    pub fn new(cfg: OidcxConfig, state: AppState<C>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(state),
        }
    }

    /// Bind the configured address and serve until SIGTERM / Ctrl-C.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = bind_listener(&self.cfg.server.listen).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves, then stop
    /// accepting and give open connections the configured grace period.
    #[instrument(skip_all, fields(listen = %self.cfg.server.listen))]
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let max_conns = self.cfg.server.max_connections.clamp(1, u32::MAX as usize);
        let semaphore = Arc::new(Semaphore::new(max_conns));
        self.log_startup(max_conns);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = accept_with_permit(&listener, &semaphore) => {
                    match accepted {
                        Ok(conn) => spawn_worker(conn, self.state.clone(), shutdown_rx.clone()),
                        Err(_) => continue,
                    }
                }
            }
        }

        drop(listener);
        let _ = shutdown_tx.send(true);

        let permits = u32::try_from(max_conns).unwrap_or(u32::MAX);
        let grace = self.cfg.server.shutdown_grace();

        match timeout(grace, semaphore.acquire_many(permits)).await {
            Ok(_) => info!(target: "oidcx::master", "All connections drained; exiting"),
            Err(_) => warn!(
                target: "oidcx::master",
                grace_secs = grace.as_secs(),
                in_flight = max_conns - semaphore.available_permits(),
                "Grace period elapsed with connections still open"
            ),
        }

        Ok(())
    }

    fn log_startup(&self, max_conns: usize) {
        let cfg = &self.cfg;
        info!(
            target: "oidcx::master",
            version = env!("CARGO_PKG_VERSION"),
            max_conns,
            upstream = %cfg.upstream.base_url(),
            cache_mode = %cfg.cache.mode,
            cache_ttl_secs = cfg.cache.ttl().as_secs(),
            "oidcx accepting connections"
        );
    }
}
