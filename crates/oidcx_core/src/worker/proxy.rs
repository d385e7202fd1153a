use http::Response;
use oidcx_cache::CacheStatus;
use oidcx_http::{
    ProxyBody,
    responses::{bad_gateway, internal_error, passthrough},
};
use oidcx_proxy::{FetchError, UpstreamClient};
use tracing::{debug, error};

use crate::AppState;

/// Resolve `url` through the cache and turn the outcome into a response.
///
/// Returns the cache status for logging; `None` when the fetch failed.
pub(crate) async fn serve_cached<C: UpstreamClient>(
    state: &AppState<C>,
    url: &str,
) -> (Response<ProxyBody>, Option<CacheStatus>) {
    match state.cache.resolve(url, || state.fetcher.fetch(url)).await {
        Ok(served) => {
            debug!(
                target: "oidcx::proxy",
                %url,
                status = served.status.as_u16(),
                cache = %served.cache_status,
                body_len = served.body.len(),
                "Serving upstream document"
            );
            let cache_status = served.cache_status;
            let resp = passthrough(served.status, &served.headers, served.body);
            (resp, Some(cache_status))
        }
        Err(err) => (error_response(url, &err), None),
    }
}

fn error_response(url: &str, err: &FetchError) -> Response<ProxyBody> {
    error!(target: "oidcx::proxy", %url, error = %err, "Upstream fetch failed");

    match err {
        FetchError::Upstream(detail) => {
            bad_gateway(format!("Failed to contact API server: {detail}"))
        }
        FetchError::RequestBuild(_) => internal_error("Failed to create request"),
        FetchError::BodyRead(_) => internal_error("Failed to read API response"),
    }
}
