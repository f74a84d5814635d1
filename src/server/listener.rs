// Listener module
// Creates the TCP listener and classifies bind failures

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::StartupError;

/// Bind the listening socket, reporting "address in use" as `PortInUse`
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    bind_socket(addr).map_err(|e| StartupError::from_bind(addr, e))
}

/// Create a `TcpListener` ready for the tokio reactor.
///
/// On Unix `SO_REUSEADDR` lets a restarted server rebind a port whose old
/// connections are still in `TIME_WAIT`. `SO_REUSEPORT` is never set: a
/// second live instance must fail to bind.
fn bind_socket(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // On Windows the same option would allow stealing a live port
    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_second_bind_reports_port_in_use() {
        let first = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();

        let err = create_listener(addr).unwrap_err();
        assert!(err.is_port_in_use());
        assert!(err.to_string().contains(&format!("Port {}", addr.port())));
    }

    #[tokio::test]
    async fn test_rebind_after_close() {
        let first = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();
        drop(first);

        assert!(create_listener(addr).is_ok());
    }
}
