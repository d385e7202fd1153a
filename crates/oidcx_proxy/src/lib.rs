//! Upstream leg of the proxy: one signed GET per call, body fully buffered,
//! headers deep-copied before they leave this crate.

mod client;
mod credential;
mod error;
mod fetch;
mod headers;

pub use client::{BoxError, ClientOptions, ReqwestClient, UpstreamClient};
pub use credential::Credential;
pub use error::{ClientBuildError, FetchError};
pub use fetch::{FetchedResponse, Fetcher};
pub use headers::clone_headers;
