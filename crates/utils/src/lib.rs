use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,oidcx=debug";

/// Install the global tracing subscriber. Call once, at startup.
///
/// `RUST_LOG` wins when present; otherwise `fallback` is used, and when that is
/// empty too, [`DEFAULT_LOG_FILTER`].
pub fn init_tracing(fallback: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if fallback.trim().is_empty() {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        } else {
            EnvFilter::new(fallback)
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}
