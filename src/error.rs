//! Startup error types
//!
//! Everything that can stop the server before it reaches the accept loop.
//! Request-level failures never surface here; they become HTTP statuses.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while bringing the server up
#[derive(Debug, Error)]
pub enum StartupError {
    /// Another process already listens on the port
    #[error("Port {port} is already in use. Try a different port or stop the existing server.")]
    PortInUse { port: u16 },

    /// Any other bind or listen failure
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("cannot serve directory '{}': {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StartupError {
    /// Classify a failed bind: "address in use" is reported on its own
    pub fn from_bind(addr: SocketAddr, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AddrInUse {
            Self::PortInUse { port: addr.port() }
        } else {
            Self::Bind { addr, source }
        }
    }

    pub const fn is_port_in_use(&self) -> bool {
        matches!(self, Self::PortInUse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "0.0.0.0:8000".parse().unwrap()
    }

    #[test]
    fn test_addr_in_use_names_port() {
        let err = StartupError::from_bind(addr(), io::Error::from(io::ErrorKind::AddrInUse));
        assert!(err.is_port_in_use());
        assert_eq!(
            err.to_string(),
            "Port 8000 is already in use. Try a different port or stop the existing server."
        );
    }

    #[test]
    fn test_other_bind_errors_keep_source() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let err = StartupError::from_bind(addr(), source);
        assert!(!err.is_port_in_use());
        assert_eq!(err.to_string(), "failed to bind 0.0.0.0:8000: permission denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
