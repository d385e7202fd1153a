use http::HeaderMap;

/// Deep copy of a header collection.
///
/// Every value of every name is copied in its original order, so repeated
/// headers (`Set-Cookie`, `Vary`, ...) survive unchanged. Cached entries must
/// own their headers outright; they are never shared with the transport.
pub fn clone_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        for value in headers.get_all(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
