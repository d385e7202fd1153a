mod common;

use std::time::Duration;

use bytes::Bytes;
use common::{BASE, FakeApi, Script, cached_state, state_with};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use oidcx_cache::ManualClock;
use oidcx_config::CacheMode;
use oidcx_core::{AppState, handle_request};
use oidcx_http::ProxyBody;

const JWKS: &str = "/openid/v1/jwks";
const DISCOVERY: &str = "/.well-known/openid-configuration";

async fn call(state: &AppState<FakeApi>, method: Method, path: &str) -> Response<ProxyBody> {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(())
        .unwrap();
    handle_request(state, req).await
}

async fn get(state: &AppState<FakeApi>, path: &str) -> Response<ProxyBody> {
    call(state, Method::GET, path).await
}

async fn body_of(resp: Response<ProxyBody>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn jwks_is_served_from_cache_until_ttl_expires() {
    let api = FakeApi::new(Script::json(br#"{"keys":["v1"]}"#));
    let (state, clock) = cached_state(api.clone());

    let first = get(&state, JWKS).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_of(first).await.as_ref(), br#"{"keys":["v1"]}"#);
    assert_eq!(api.calls(), 1);

    // Rotated upstream; still inside the TTL.
    api.set(Script::json(br#"{"keys":["v2"]}"#));
    clock.set_elapsed(Duration::from_secs(60));
    let second = get(&state, JWKS).await;
    assert_eq!(body_of(second).await.as_ref(), br#"{"keys":["v1"]}"#);
    assert_eq!(api.calls(), 1);

    clock.set_elapsed(Duration::from_secs(121));
    let third = get(&state, JWKS).await;
    assert_eq!(body_of(third).await.as_ref(), br#"{"keys":["v2"]}"#);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn each_route_hits_its_own_upstream_path_with_the_bearer_token() {
    let api = FakeApi::new(Script::json(b"{}"));
    let (state, _clock) = cached_state(api.clone());

    assert_eq!(get(&state, JWKS).await.status(), StatusCode::OK);
    assert_eq!(get(&state, DISCOVERY).await.status(), StatusCode::OK);
    // Second round is all cache hits.
    get(&state, JWKS).await;
    get(&state, DISCOVERY).await;

    let seen = api.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, format!("{BASE}{JWKS}"));
    assert_eq!(seen[1].0, format!("{BASE}{DISCOVERY}"));
    for (_, auth) in &seen {
        assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    }
    assert_eq!(state.cache.len(), 2);
}

#[tokio::test]
async fn upstream_headers_are_replayed_on_miss_and_hit() {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.append(header::VARY, HeaderValue::from_static("Accept"));
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
    let api = FakeApi::new(Script::Reply {
        status: StatusCode::OK,
        headers,
        body: b"{}",
    });
    let (state, _clock) = cached_state(api.clone());

    for _ in 0..2 {
        let resp = get(&state, DISCOVERY).await;
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let vary: Vec<_> = resp.headers().get_all(header::VARY).iter().collect();
        assert_eq!(vary, ["Accept", "Origin"]);
    }
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway_and_caches_nothing() {
    let api = FakeApi::new(Script::Refuse);
    let (state, _clock) = cached_state(api.clone());

    let resp = get(&state, JWKS).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_of(resp).await;
    assert!(
        body.starts_with(b"Failed to contact API server: "),
        "unexpected body: {body:?}"
    );
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_the_stale_entry() {
    let api = FakeApi::new(Script::json(b"old"));
    let (state, clock) = cached_state(api.clone());

    assert_eq!(body_of(get(&state, JWKS).await).await.as_ref(), b"old");

    clock.set_elapsed(Duration::from_secs(200));
    api.set(Script::Refuse);
    assert_eq!(get(&state, JWKS).await.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(state.cache.len(), 1);

    api.set(Script::json(b"new"));
    assert_eq!(body_of(get(&state, JWKS).await).await.as_ref(), b"new");
    assert_eq!(api.calls(), 3);
}

#[tokio::test]
async fn broken_body_is_an_internal_error() {
    let api = FakeApi::new(Script::BreakBody);
    let (state, _clock) = cached_state(api.clone());

    let resp = get(&state, DISCOVERY).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(resp).await.as_ref(), b"Failed to read API response\n");
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn error_statuses_are_forwarded_but_not_cached() {
    let api = FakeApi::new(Script::status(StatusCode::SERVICE_UNAVAILABLE, b"down"));
    let (state, _clock) = cached_state(api.clone());

    for _ in 0..2 {
        let resp = get(&state, JWKS).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_of(resp).await.as_ref(), b"down");
    }
    assert_eq!(api.calls(), 2);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn passthrough_mode_always_goes_upstream() {
    let api = FakeApi::new(Script::json(b"{}"));
    let state = state_with(
        api.clone(),
        std::sync::Arc::new(ManualClock::new()),
        CacheMode::Passthrough,
    );

    for _ in 0..3 {
        assert_eq!(get(&state, JWKS).await.status(), StatusCode::OK);
    }
    assert_eq!(api.calls(), 3);
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn healthz_answers_locally_with_an_empty_body() {
    let api = FakeApi::new(Script::Refuse);
    let (state, _clock) = cached_state(api.clone());

    let resp = get(&state, "/healthz").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.is_empty());
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn healthz_accepts_any_method() {
    let api = FakeApi::new(Script::Refuse);
    let (state, _clock) = cached_state(api.clone());

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
        let resp = call(&state, method.clone(), "/healthz").await;
        assert_eq!(resp.status(), StatusCode::OK, "method {method}");
    }
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let api = FakeApi::new(Script::json(b"{}"));
    let (state, _clock) = cached_state(api.clone());

    for path in ["/", "/openid/v1/jwks/", "/.well-known/openid-configuration/extra"] {
        let resp = get(&state, path).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
        assert_eq!(body_of(resp).await.as_ref(), b"404 page not found\n");
    }
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn only_get_and_head_are_accepted() {
    let api = FakeApi::new(Script::json(b"{}"));
    let (state, _clock) = cached_state(api.clone());

    let resp = call(&state, Method::POST, JWKS).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "GET, HEAD");
    assert_eq!(api.calls(), 0);

    let resp = call(&state, Method::HEAD, JWKS).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(api.calls(), 1);
}
