//! Configuration for the oidcx proxy.
//!
//! Values come from an optional `oidcx.toml` and are then overridden by the
//! environment variables the proxy has always honoured (`TOKEN_PATH`,
//! `CA_CERT_PATH`, `CACHE_TTL_MINUTES`, ...).

mod cache;
mod env;
mod global;
mod oidcx;
mod server;
mod upstream;
pub mod validation;

pub use cache::{CacheConfig, CacheMode, DEFAULT_CACHE_TTL_MINUTES, MAX_CACHE_TTL_MINUTES};
pub use env::{
    ENV_CA_CERT_PATH, ENV_CACHE_MODE, ENV_CACHE_TTL_MINUTES, ENV_CONFIG_PATH, ENV_LISTEN_ADDR,
    ENV_TOKEN_PATH, ENV_UPSTREAM_BASE_URL,
};
pub use global::GlobalConfig;
pub use oidcx::{DEFAULT_CONFIG_FILE, OidcxConfig};
pub use server::ServerConfig;
pub use upstream::{
    DEFAULT_CA_CERT_PATH, DEFAULT_TOKEN_PATH, DEFAULT_UPSTREAM_BASE_URL, UpstreamConfig,
};
pub use validation::{ConfigIssue, ConfigReport, Severity};
