use thiserror::Error;

/// Why a single upstream fetch failed.
///
/// None of these are retried and none are cached; the handler turns each one
/// into a response for the request that triggered it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The outbound request could not be built (bad URL, bad token bytes).
    #[error("failed to create request: {0}")]
    RequestBuild(String),

    /// DNS, TCP, TLS or timeout failure reaching the API server.
    #[error("failed to contact API server: {0}")]
    Upstream(String),

    /// Connected, but the body stream failed or exceeded the size limit.
    #[error("failed to read API response: {0}")]
    BodyRead(String),
}

/// Errors while building the production upstream client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid PEM in CA bundle: {0}")]
    InvalidPem(#[from] std::io::Error),

    #[error("no certificates found in CA bundle")]
    NoCertificates,

    #[error("invalid CA certificate: {0}")]
    InvalidCertificate(reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Build(reqwest::Error),
}
