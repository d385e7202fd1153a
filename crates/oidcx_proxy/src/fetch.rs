use bytes::Bytes;
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::{BodyExt, Limited};
use tracing::{debug, instrument, warn};

use crate::{Credential, FetchError, UpstreamClient, clone_headers};

/// A fully materialised upstream response.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    /// Owned copy, independent of the transport's header storage.
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Performs signed GETs against the API server.
#[derive(Debug)]
pub struct Fetcher<C> {
    client: C,
    credential: Credential,
    max_body_bytes: Option<usize>,
}

impl<C: UpstreamClient> Fetcher<C> {
    pub fn new(client: C, credential: Credential) -> Self {
        Self {
            client,
            credential,
            max_body_bytes: None,
        }
    }

    /// Reject upstream bodies larger than `limit` bytes.
    pub fn with_max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// One GET to `url` with `Authorization: Bearer <token>`, body fully read.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let auth = self
            .credential
            .bearer_header()
            .map_err(|e| FetchError::RequestBuild(e.to_string()))?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(header::AUTHORIZATION, auth)
            .body(Bytes::new())
            .map_err(|e| FetchError::RequestBuild(e.to_string()))?;

        let resp = self.client.execute(req).await.map_err(|e| {
            warn!(target: "oidcx::proxy", error = %e, "Upstream request failed");
            FetchError::Upstream(e.to_string())
        })?;

        let (parts, body) = resp.into_parts();
        let headers = clone_headers(&parts.headers);

        let limit = self.max_body_bytes.unwrap_or(usize::MAX);
        let body = Limited::new(body, limit)
            .collect()
            .await
            .map_err(|e| {
                warn!(target: "oidcx::proxy", error = %e, "Failed to read upstream body");
                FetchError::BodyRead(e.to_string())
            })?
            .to_bytes();

        debug!(
            target: "oidcx::proxy",
            status = parts.status.as_u16(),
            body_len = body.len(),
            header_count = headers.len(),
            "Fetched upstream response"
        );

        Ok(FetchedResponse {
            status: parts.status,
            headers,
            body,
        })
    }
}
