use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Response, StatusCode, header};
use http_body_util::Full;

/// Body type for everything the proxy sends back.
pub type ProxyBody = Full<Bytes>;

const SERVER: &str = concat!("oidcx/", env!("CARGO_PKG_VERSION"));

/// Replay an upstream (or cached) response: every value of every header, the
/// given status, the exact body bytes.
pub fn passthrough(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Response<ProxyBody> {
    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    let out = resp.headers_mut();
    for (name, value) in headers.iter() {
        out.append(name.clone(), value.clone());
    }
    resp
}

/// Locally generated plain-text response (errors, 404, 405).
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response<ProxyBody> {
    let mut body = body.into();
    if !body.ends_with('\n') {
        body.push('\n');
    }

    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(header::SERVER, HeaderValue::from_static(SERVER));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    resp
}

/// Status only, empty body.
pub fn empty(status: StatusCode) -> Response<ProxyBody> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

pub fn ok_empty() -> Response<ProxyBody> {
    empty(StatusCode::OK)
}

pub fn not_found() -> Response<ProxyBody> {
    text_response(StatusCode::NOT_FOUND, "404 page not found")
}

pub fn method_not_allowed(allow: &'static str) -> Response<ProxyBody> {
    let mut resp = text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    resp.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    resp
}

pub fn bad_gateway(message: impl Into<String>) -> Response<ProxyBody> {
    text_response(StatusCode::BAD_GATEWAY, message)
}

pub fn internal_error(message: impl Into<String>) -> Response<ProxyBody> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}
