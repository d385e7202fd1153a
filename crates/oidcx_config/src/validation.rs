use std::{fmt, net::SocketAddr, path::Path};

use crate::{CacheMode, OidcxConfig};

/// How bad a [`ConfigIssue`] is. Errors stop startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One finding, tied to the config key it concerns.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

#[derive(Debug, Default)]
pub struct ConfigReport {
    issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Error)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    fn push(&mut self, severity: Severity, key: &'static str, message: impl Into<String>) {
        self.issues.push(ConfigIssue {
            severity,
            key,
            message: message.into(),
        });
    }

    fn warn(&mut self, key: &'static str, message: impl Into<String>) {
        self.push(Severity::Warning, key, message);
    }

    fn error(&mut self, key: &'static str, message: impl Into<String>) {
        self.push(Severity::Error, key, message);
    }
}

/// Errors first, one issue per line.
impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in self.errors() {
            writeln!(f, "error: {issue}")?;
        }
        for issue in self.warnings() {
            writeln!(f, "warning: {issue}")?;
        }
        Ok(())
    }
}

/// Check a loaded configuration. Defaults have already been applied.
pub fn validate(cfg: &OidcxConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    for warning in &cfg.load_warnings {
        report.warn("load", warning.clone());
    }

    validate_server(cfg, &mut report);
    validate_upstream(cfg, &mut report);
    validate_cache(cfg, &mut report);

    report
}

fn validate_server(cfg: &OidcxConfig, report: &mut ConfigReport) {
    let listen = cfg.server.listen.as_str();
    if listen.trim().is_empty() {
        report.error("server.listen", "is empty");
    } else if listen.parse::<SocketAddr>().is_err() {
        report.warn(
            "server.listen",
            format!("'{listen}' is not a socket address; DNS resolution will be used"),
        );
    }
}

fn validate_upstream(cfg: &OidcxConfig, report: &mut ConfigReport) {
    let upstream = &cfg.upstream;
    let base = upstream.base_url();

    if base.is_empty() {
        report.error("upstream.base_url", "is empty");
    } else if let Some(rest) = base.strip_prefix("http://") {
        report.warn(
            "upstream.base_url",
            format!("'{base}' is plain HTTP; the bearer token to '{rest}' is sent unencrypted"),
        );
    } else if !base.starts_with("https://") {
        report.error(
            "upstream.base_url",
            format!("'{base}' must start with https:// or http://"),
        );
    }

    for (key, path) in [
        ("upstream.token_path", upstream.token_path.as_str()),
        ("upstream.ca_cert_path", upstream.ca_cert_path.as_str()),
    ] {
        if path.trim().is_empty() {
            report.error(key, "is empty");
        } else if !Path::new(path).is_file() {
            report.error(key, format!("'{path}' not found"));
        }
    }

    if upstream.request_timeout_secs == 0 {
        report.warn(
            "upstream.request_timeout_secs",
            "is 0; upstream calls can hang indefinitely",
        );
    } else if upstream.request_timeout_secs < upstream.connect_timeout_secs {
        report.warn(
            "upstream.request_timeout_secs",
            format!(
                "({}) is shorter than connect_timeout_secs ({})",
                upstream.request_timeout_secs, upstream.connect_timeout_secs
            ),
        );
    }

    if upstream.max_body_bytes == 0 {
        report.warn("upstream.max_body_bytes", "is 0; upstream bodies are not size-limited");
    }
}

fn validate_cache(cfg: &OidcxConfig, report: &mut ConfigReport) {
    if cfg.cache.mode == CacheMode::Passthrough {
        report.warn(
            "cache.mode",
            "passthrough; every request is forwarded to the API server",
        );
    }
}
