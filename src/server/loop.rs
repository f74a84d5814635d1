// Server loop module
// Accepts connections one at a time until shutdown is requested

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::serve_connection;
use super::listener::create_listener;
use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::error::StartupError;
use crate::logger;

/// A bound server in the `Listening` state
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Bind the configured address
    pub fn bind(state: Arc<AppState>) -> Result<Self, StartupError> {
        let addr = state.config.get_socket_addr()?;
        Self::bind_to(addr, state)
    }

    /// Bind an explicit address
    pub fn bind_to(addr: SocketAddr, state: Arc<AppState>) -> Result<Self, StartupError> {
        Ok(Self {
            listener: create_listener(addr)?,
            state,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop until `shutdown` fires, then close the listener.
    ///
    /// Each connection is served to completion before the next accept, so
    /// requests are answered strictly in arrival order. A shutdown request
    /// made while a connection is open lets its response finish and closes
    /// an idle connection at once.
    pub async fn serve(self, shutdown: &ShutdownSignal) {
        let Self { listener, state } = self;

        loop {
            tokio::select! {
                biased;

                () = shutdown.wait() => break,

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            if serve_connection(stream, peer_addr, &state, shutdown).await {
                                break;
                            }
                        }
                        Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                    }
                }
            }
        }

        drop(listener);
    }
}
