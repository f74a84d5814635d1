// Configuration module entry point
// Loads settings from defaults and SERVE_* environment variables

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AccessLogFormat, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Prefix of environment overrides, e.g. `SERVE_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "SERVE";

impl Config {
    /// Load configuration from defaults and the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from defaults overlaid with the given environment source
    pub fn load_from(env: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.entry_point", "state-machine-test.html")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.read_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("cors-serve/", env!("CARGO_PKG_VERSION")),
            )?
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| StartupError::InvalidAddress { addr, reason: format!("{e}") })
    }

    /// Resolve the served directory once, to an absolute canonical path
    pub fn resolve_root(&self) -> Result<PathBuf, StartupError> {
        let requested = match &self.server.root {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|source| StartupError::Root {
                path: PathBuf::from("."),
                source,
            })?,
        };

        let root = requested
            .canonicalize()
            .map_err(|source| StartupError::Root {
                path: requested.clone(),
                source,
            })?;

        if !root.is_dir() {
            return Err(StartupError::Root {
                path: requested,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        Ok(root)
    }
}
