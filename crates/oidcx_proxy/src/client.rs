use std::{future::Future, io::BufReader, time::Duration};

use bytes::Bytes;
use http::{Request, Response};
use http_body::Body;
use tracing::debug;

use crate::error::ClientBuildError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The "signed HTTP client" capability: executes one request against the API
/// server with whatever trust roots the implementation was built with.
///
/// Errors returned from `execute` are transport failures. Reading the body is
/// left to the caller so that body failures can be told apart.
pub trait UpstreamClient: Send + Sync {
    type Body: Body<Data = Bytes, Error: Into<BoxError>> + Send;

    fn execute(
        &self,
        req: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Self::Body>, BoxError>> + Send;
}

/// Timeouts for [`ReqwestClient`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    /// `None` means no overall deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Production client: reqwest over rustls, trusting only the cluster CA.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client whose only trust roots are the certificates in `ca_pem`.
    pub fn new(ca_pem: &[u8], options: ClientOptions) -> Result<Self, ClientBuildError> {
        let certs = load_ca_certs(ca_pem)?;
        debug!(
            target: "oidcx::proxy",
            certificates = certs.len(),
            "Loaded CA bundle for upstream client"
        );

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(options.connect_timeout);

        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }

        let inner = builder.build().map_err(ClientBuildError::Build)?;
        Ok(Self { inner })
    }
}

impl UpstreamClient for ReqwestClient {
    type Body = reqwest::Body;

    async fn execute(&self, req: Request<Bytes>) -> Result<Response<Self::Body>, BoxError> {
        let req = reqwest::Request::try_from(req)?;
        let resp = self.inner.execute(req).await?;
        Ok(Response::from(resp))
    }
}

/// Parse a PEM bundle into reqwest certificates.
fn load_ca_certs(ca_pem: &[u8]) -> Result<Vec<reqwest::Certificate>, ClientBuildError> {
    let mut reader = BufReader::new(ca_pem);
    let ders = rustls_pemfile::certs(&mut reader)?;
    if ders.is_empty() {
        return Err(ClientBuildError::NoCertificates);
    }

    ders.iter()
        .map(|der| reqwest::Certificate::from_der(der).map_err(ClientBuildError::InvalidCertificate))
        .collect()
}
