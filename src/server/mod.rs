// Server module entry point
// Startup, the accept loop, and interrupt-driven shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::sync::Arc;

use crate::config::AppState;
use crate::error::StartupError;
use crate::logger;

pub use listener::create_listener;
pub use server_loop::Server;
pub use signal::{start_signal_handler, ShutdownSignal};

/// Bind, announce, serve until interrupted, announce the stop.
///
/// Returns an error only for failures before the accept loop starts.
pub async fn run(state: Arc<AppState>) -> Result<(), StartupError> {
    let server = Server::bind(Arc::clone(&state))?;
    let port = server.local_addr()?.port();

    let shutdown = Arc::new(ShutdownSignal::new());
    start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(port, &state.config.server.entry_point);
    server.serve(&shutdown).await;
    logger::log_server_stopped();

    Ok(())
}
