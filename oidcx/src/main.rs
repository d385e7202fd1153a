use anyhow::{Context, bail};
use oidcx_config::OidcxConfig;
use oidcx_core::{AppState, Master};
use oidcx_proxy::{ClientOptions, Credential, Fetcher, ReqwestClient};
use tracing::{error, info, warn};
use utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = OidcxConfig::load().context("failed to load configuration")?;
    init_tracing(cfg.global.log_level());

    let report = cfg.validate();
    for w in report.warnings() {
        warn!(target: "oidcx::config", key = w.key, "{}", w.message);
    }
    if report.has_errors() {
        for e in report.errors() {
            error!(target: "oidcx::config", key = e.key, "{}", e.message);
        }
        bail!("invalid configuration:\n{report}");
    }

    let token = tokio::fs::read(cfg.upstream.token_path())
        .await
        .with_context(|| format!("failed to read token from {}", cfg.upstream.token_path()))?;
    let credential = Credential::from_bytes(&token);
    if credential.is_empty() {
        bail!("token file {} is empty", cfg.upstream.token_path());
    }

    let ca = tokio::fs::read(cfg.upstream.ca_cert_path())
        .await
        .with_context(|| format!("failed to read CA bundle from {}", cfg.upstream.ca_cert_path()))?;

    let client = ReqwestClient::new(
        &ca,
        ClientOptions {
            connect_timeout: cfg.upstream.connect_timeout(),
            request_timeout: cfg.upstream.request_timeout(),
        },
    )
    .context("failed to build upstream client")?;

    info!(
        target: "oidcx::main",
        token_path = %cfg.upstream.token_path(),
        ca_cert_path = %cfg.upstream.ca_cert_path(),
        "Upstream credentials loaded"
    );

    let fetcher = Fetcher::new(client, credential).with_max_body_bytes(cfg.upstream.max_body_bytes());
    let state = AppState::new(&cfg, fetcher);

    Master::new(cfg, state).run().await
}
