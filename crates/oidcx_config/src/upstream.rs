use std::time::Duration;

use serde::Deserialize;

/// In-cluster API server origin.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://kubernetes.default.svc";
/// Projected service-account token.
pub const DEFAULT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
/// Cluster CA bundle mounted next to the token.
pub const DEFAULT_CA_CERT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

// =======================================================
// UPSTREAM CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme + authority of the API server, without a trailing path.
    pub base_url: String,
    pub token_path: String,
    pub ca_cert_path: String,

    // Timeouts (seconds)
    pub connect_timeout_secs: u64,
    /// 0 disables the overall request timeout.
    pub request_timeout_secs: u64,

    /// Largest upstream body accepted, in bytes. 0 disables the limit.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.into(),
            token_path: DEFAULT_TOKEN_PATH.into(),
            ca_cert_path: DEFAULT_CA_CERT_PATH.into(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl UpstreamConfig {
    /// Base URL with any trailing `/` removed, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn token_path(&self) -> &str {
        &self.token_path
    }

    pub fn ca_cert_path(&self) -> &str {
        &self.ca_cert_path
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn max_body_bytes(&self) -> Option<usize> {
        (self.max_body_bytes > 0).then_some(self.max_body_bytes)
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &UpstreamConfig) {
        if self.base_url.trim().is_empty() {
            self.base_url = defaults.base_url.clone();
        }
        if self.token_path.trim().is_empty() {
            self.token_path = defaults.token_path.clone();
        }
        if self.ca_cert_path.trim().is_empty() {
            self.ca_cert_path = defaults.ca_cert_path.clone();
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = defaults.connect_timeout_secs;
        }
    }
}
