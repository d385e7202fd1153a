use tracing::debug;

pub const JWKS_PATH: &str = "/openid/v1/jwks";
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";
pub const HEALTH_PATH: &str = "/healthz";

/// The fixed set of paths this proxy answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Jwks,
    Discovery,
    Health,
}

impl Route {
    /// Exact match only; no prefix or trailing-slash leniency.
    pub fn from_path(path: &str) -> Option<Self> {
        let route = match path {
            JWKS_PATH => Some(Route::Jwks),
            DISCOVERY_PATH => Some(Route::Discovery),
            HEALTH_PATH => Some(Route::Health),
            _ => None,
        };

        debug!(
            target: "oidcx::router",
            request_path = %path,
            matched = ?route,
            "Matched route by exact path"
        );

        route
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Jwks => JWKS_PATH,
            Route::Discovery => DISCOVERY_PATH,
            Route::Health => HEALTH_PATH,
        }
    }
}

/// Upstream URL for each proxied route, computed once from the base origin.
#[derive(Debug, Clone)]
pub struct RouteTable {
    jwks_url: String,
    discovery_url: String,
}

impl RouteTable {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            jwks_url: format!("{base}{JWKS_PATH}"),
            discovery_url: format!("{base}{DISCOVERY_PATH}"),
        }
    }

    /// `None` for routes answered locally.
    pub fn upstream_url(&self, route: Route) -> Option<&str> {
        match route {
            Route::Jwks => Some(&self.jwks_url),
            Route::Discovery => Some(&self.discovery_url),
            Route::Health => None,
        }
    }
}
