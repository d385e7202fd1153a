use serde::Deserialize;

use crate::env::ENV_CONFIG_PATH;
use crate::validation::{ConfigReport, validate};
use crate::{CacheConfig, GlobalConfig, ServerConfig, UpstreamConfig};

/// Config file read when `OIDCX_CONFIG` is unset. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "oidcx.toml";

// =======================================================
// OIDCX CONFIG: main config
// =======================================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct OidcxConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Problems noticed while loading that did not stop the load.
    #[serde(skip)]
    pub(crate) load_warnings: Vec<String>,
}

impl OidcxConfig {
    /// Validate the configuration and return a report of warnings and errors.
    pub fn validate(&self) -> ConfigReport {
        validate(self)
    }

    /// Load from the process environment: `$OIDCX_CONFIG` (or `oidcx.toml`)
    /// first, then the legacy env variables on top.
    pub fn load() -> Result<Self, config::ConfigError> {
        let file_name =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(&file_name, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(file_name: &str, lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::read_file(file_name)?;
        cfg.apply_env_overrides(lookup);
        cfg.apply_defaults();
        Ok(cfg)
    }

    pub fn from_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let mut cfg = Self::read_file(file_name)?;
        cfg.apply_defaults();
        Ok(cfg)
    }

    fn read_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::new(file_name, config::FileFormat::Toml).required(false))
            .build()?;

        built.try_deserialize()
    }

    fn apply_defaults(&mut self) {
        let def_global = GlobalConfig::default();
        self.global.apply_defaults_from(&def_global);

        let def_server = ServerConfig::default();
        self.server.apply_defaults_from(&def_server);

        let def_upstream = UpstreamConfig::default();
        self.upstream.apply_defaults_from(&def_upstream);

        let def_cache = CacheConfig::default();
        if let Some(warning) = self.cache.apply_defaults_from(&def_cache) {
            self.load_warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::OidcxConfig;
    use crate::{CacheMode, DEFAULT_UPSTREAM_BASE_URL};

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = OidcxConfig::from_file("/definitely/not/here/oidcx.toml").expect("defaults");
        assert_eq!(cfg.server.listen, "0.0.0.0:8080");
        assert_eq!(cfg.upstream.base_url, DEFAULT_UPSTREAM_BASE_URL);
        assert_eq!(cfg.cache.ttl().as_secs(), 120);
        assert_eq!(cfg.cache.mode, CacheMode::Cached);
    }

    #[test]
    fn file_values_are_read() {
        let file = write_toml(
            r#"
[server]
listen = "127.0.0.1:9000"
max_connections = 16

[upstream]
base_url = "https://api.example.internal:6443/"
max_body_bytes = 2048

[cache]
ttl_minutes = 10
mode = "passthrough"
"#,
        );
        let path = file.path().to_str().expect("utf-8 path");
        let cfg = OidcxConfig::from_file(path).expect("parsed config");

        assert_eq!(cfg.server.listen, "127.0.0.1:9000");
        assert_eq!(cfg.server.max_connections, 16);
        assert_eq!(cfg.upstream.base_url(), "https://api.example.internal:6443");
        assert_eq!(cfg.upstream.max_body_bytes(), Some(2048));
        assert_eq!(cfg.cache.ttl().as_secs(), 600);
        assert_eq!(cfg.cache.mode, CacheMode::Passthrough);
    }

    #[test]
    fn env_wins_over_file() {
        let file = write_toml("[cache]\nttl_minutes = 10\n");
        let path = file.path().to_str().expect("utf-8 path");
        let cfg = OidcxConfig::from_sources(path, |key| {
            (key == "CACHE_TTL_MINUTES").then(|| "3".to_string())
        })
        .expect("parsed config");
        assert_eq!(cfg.cache.ttl_minutes, 3);
    }

    #[test]
    fn non_positive_file_ttl_is_replaced_with_warning() {
        let file = write_toml("[cache]\nttl_minutes = 0\n");
        let path = file.path().to_str().expect("utf-8 path");
        let cfg = OidcxConfig::from_file(path).expect("parsed config");
        assert_eq!(cfg.cache.ttl_minutes, 2);
        assert_eq!(cfg.load_warnings.len(), 1);
    }

    #[test]
    fn oversized_ttl_from_file_or_env_falls_back_to_default() {
        let file = write_toml("[cache]\nttl_minutes = 153722867280912930\n");
        let path = file.path().to_str().expect("utf-8 path");
        let cfg = OidcxConfig::from_file(path).expect("parsed config");
        assert_eq!(cfg.cache.ttl_minutes, 2);
        assert_eq!(cfg.load_warnings.len(), 1);

        let cfg = OidcxConfig::from_sources("/definitely/not/here/oidcx.toml", |key| {
            (key == "CACHE_TTL_MINUTES").then(|| "153722867280912930".to_string())
        })
        .expect("parsed config");
        assert_eq!(cfg.cache.ttl().as_secs(), 120);
        assert_eq!(cfg.load_warnings.len(), 1);
    }

    #[test]
    fn zero_max_connections_is_defaulted_on_load() {
        let file = write_toml("[server]\nmax_connections = 0\n");
        let path = file.path().to_str().expect("utf-8 path");
        let cfg = OidcxConfig::from_file(path).expect("parsed config");
        assert_eq!(cfg.server.max_connections, 1024);
    }
}
