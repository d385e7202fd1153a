use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use oidcx_proxy::UpstreamClient;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tracing::{debug, error, info};

use crate::{AppState, worker::serve_connection};

/// Pause after a failed accept (e.g. EMFILE) before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub(crate) async fn bind_listener(listen_addr: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;

    info!(
        target: "oidcx::master",
        listen = %listen_addr,
        local_addr = ?listener.local_addr().ok(),
        "Listening"
    );
    Ok(listener)
}

pub(super) struct AcceptedConn {
    pub(super) stream: TcpStream,
    pub(super) addr: SocketAddr,
    pub(super) permit: OwnedSemaphorePermit,
}

/// Accept one connection, then wait for a permit to serve it.
pub(super) async fn accept_with_permit(
    listener: &TcpListener,
    semaphore: &Arc<Semaphore>,
) -> anyhow::Result<AcceptedConn> {
    let (stream, addr) = match listener.accept().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(
                target: "oidcx::master",
                error = ?e,
                "Failed to accept connection"
            );
            tokio::time::sleep(ACCEPT_BACKOFF).await;
            return Err(e.into());
        }
    };

    let permit = semaphore.clone().acquire_owned().await?;

    debug!(
        target: "oidcx::master",
        client_addr = %addr,
        available_permits = semaphore.available_permits(),
        "Connection accepted"
    );

    Ok(AcceptedConn {
        stream,
        addr,
        permit,
    })
}

/// One task per connection; the permit is released when the task ends.
pub(super) fn spawn_worker<C>(
    conn: AcceptedConn,
    state: Arc<AppState<C>>,
    shutdown: watch::Receiver<bool>,
) where
    C: UpstreamClient + 'static,
{
    let AcceptedConn {
        stream,
        addr,
        permit,
    } = conn;

    tokio::spawn(async move {
        let _permit = permit;

        if let Err(e) = serve_connection(stream, addr, state, shutdown).await {
            error!(
                target: "oidcx::worker",
                client_addr = %addr,
                error = ?e,
                "Error while handling connection"
            );
        } else {
            debug!(
                target: "oidcx::worker",
                client_addr = %addr,
                "Connection handled successfully"
            );
        }
    });
}
