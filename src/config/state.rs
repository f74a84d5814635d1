// Application state module
// Read-only state shared between the accept loop and the request handler

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Config;

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Canonical directory every request path resolves under
    root: PathBuf,
    pub config: Config,
}

impl AppState {
    pub const fn new(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }

    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.config.performance.read_timeout)
    }
}
