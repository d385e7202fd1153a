//! Per-connection HTTP/1 handler.
//!
//! Matches the request path against the fixed route table and either answers
//! locally (`/healthz`) or goes through the cache to the API server.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Instant};

use anyhow::Context;
use http::{Method, Request, Response};
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use oidcx_http::{
    ProxyBody,
    responses::{method_not_allowed, not_found, ok_empty},
};
use oidcx_proxy::UpstreamClient;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::watch,
};
use tracing::{debug, info, instrument, warn};

use crate::AppState;

mod proxy;
mod routing;

pub use routing::{DISCOVERY_PATH, HEALTH_PATH, JWKS_PATH, Route, RouteTable};

const ALLOWED_METHODS: &str = "GET, HEAD";

/// Answer one request. Never fails: every error becomes a status code.
///
/// `/healthz` answers any method; the proxied routes take GET and HEAD only.
pub async fn handle_request<C, B>(state: &AppState<C>, req: Request<B>) -> Response<ProxyBody>
where
    C: UpstreamClient,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let (resp, cache_status) = match Route::from_path(&path) {
        None => (not_found(), None),
        Some(Route::Health) => (ok_empty(), None),
        Some(_) if method != Method::GET && method != Method::HEAD => {
            warn!(
                target: "oidcx::worker",
                %method,
                %path,
                "Unsupported method; returning 405"
            );
            (method_not_allowed(ALLOWED_METHODS), None)
        }
        Some(route) => match state.routes.upstream_url(route) {
            Some(url) => proxy::serve_cached(state, url).await,
            None => (not_found(), None),
        },
    };

    info!(
        target: "oidcx::access",
        %method,
        %path,
        status = resp.status().as_u16(),
        cache = cache_status.map(|s| s.as_str()).unwrap_or("-"),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    resp
}

/// Serve HTTP/1.1 on one accepted stream until the client goes away or
/// `shutdown` flips, in which case in-flight requests are allowed to finish.
#[instrument(skip(stream, state, shutdown), fields(client = %client_addr))]
pub async fn serve_connection<C, S>(
    stream: S,
    client_addr: SocketAddr,
    state: Arc<AppState<C>>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()>
where
    C: UpstreamClient + 'static,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    debug!(target: "oidcx::worker", "Handling new client connection");

    let io = TokioIo::new(stream);
    let service = service_fn(move |req: Request<Incoming>| {
        let state = state.clone();
        async move { Ok::<_, Infallible>(handle_request(&state, req).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        res = conn.as_mut() => {
            res.context("HTTP/1 connection error")?;
        }
        _ = shutdown.changed() => {
            debug!(target: "oidcx::worker", "Shutdown requested; draining connection");
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await.context("HTTP/1 connection error during shutdown")?;
        }
    }

    Ok(())
}
