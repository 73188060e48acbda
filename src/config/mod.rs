// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AppConfig, Config, CorsConfig};

/// Config file used when `APP_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Secret key shipped as default, flagged at startup
pub const PLACEHOLDER_SECRET_KEY: &str = "dev-secret-key-change-me";

impl Config {
    /// Load configuration from the process environment
    ///
    /// The config file path comes from `APP_CONFIG`, falling back to `config`
    /// (any extension the `config` crate understands, e.g. `config.toml`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let path = env
            .get("APP_CONFIG")
            .map_or(DEFAULT_CONFIG_PATH, String::as_str)
            .to_string();
        Self::build(Some(&path), &env)
    }

    /// Build configuration from an optional file and an explicit environment map
    ///
    /// Precedence, lowest first: defaults, file, `APP__*` variables, then the
    /// well-known `PORT`, `FLASK_DEBUG`/`DEBUG` and `SECRET_KEY` variables.
    pub fn build(
        config_path: Option<&str>,
        env: &HashMap<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let container_default = env
            .get("HOSTNAME")
            .filter(|h| !h.is_empty())
            .map_or("backend-container", String::as_str);
        let debug = env.get("FLASK_DEBUG").or_else(|| env.get("DEBUG")).cloned();

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("app.debug", false)?
            .set_default("app.secret_key", PLACEHOLDER_SECRET_KEY)?
            .set_default("app.service_name", "backend-api")?
            .set_default("app.backend_name", "Rust + Hyper")?
            .set_default("app.container_name", container_default)?
            .set_default("app.version", env!("CARGO_PKG_VERSION"))?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.max_body_size", 1_048_576)?; // 1MB

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .source(Some(env.clone())),
            )
            .set_override_option("server.port", env.get("PORT").cloned())?
            .set_override_option("app.debug", debug)?
            .set_override_option("app.secret_key", env.get("SECRET_KEY").cloned())?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        if cfg.app.debug && cfg.logging.level.eq_ignore_ascii_case("info") {
            cfg.logging.level = "debug".to_string();
        }
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Whether the signing key is still the shipped placeholder
    pub fn uses_placeholder_secret(&self) -> bool {
        self.app.secret_key == PLACEHOLDER_SECRET_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::build(None, &HashMap::new()).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5000);
        assert!(!cfg.app.debug);
        assert!(cfg.uses_placeholder_secret());
        assert_eq!(cfg.app.version, "1.0.0");
        assert_eq!(cfg.app.container_name, "backend-container");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.cors, CorsConfig::default());
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_port_and_secret_override() {
        let cfg = Config::build(None, &env(&[("PORT", "8081"), ("SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.app.secret_key, "s3cret");
        assert!(!cfg.uses_placeholder_secret());
    }

    #[test]
    fn test_flask_debug_enables_debug_logging() {
        let cfg = Config::build(None, &env(&[("FLASK_DEBUG", "1")])).unwrap();
        assert!(cfg.app.debug);
        assert_eq!(cfg.logging.level, "debug");

        let cfg = Config::build(None, &env(&[("DEBUG", "true")])).unwrap();
        assert!(cfg.app.debug);
    }

    #[test]
    fn test_flask_debug_wins_over_debug() {
        let cfg = Config::build(None, &env(&[("FLASK_DEBUG", "0"), ("DEBUG", "1")])).unwrap();
        assert!(!cfg.app.debug);
    }

    #[test]
    fn test_prefixed_env_and_hostname() {
        let cfg = Config::build(
            None,
            &env(&[
                ("APP__SERVER__WORKERS", "4"),
                ("APP__LOGGING__ACCESS_LOG_FORMAT", "json"),
                ("HOSTNAME", "abc123"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.server.workers, Some(4));
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(cfg.app.container_name, "abc123");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Config::build(None, &env(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_missing_config_file_is_optional() {
        let cfg = Config::build(Some("/nonexistent/demo-backend"), &HashMap::new()).unwrap();
        assert_eq!(cfg.server.port, 5000);
    }
}
