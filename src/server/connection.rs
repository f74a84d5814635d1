// Connection handling module
// Serves one TCP connection to completion

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve a single connection and return once it is closed.
///
/// The connection answers exactly one request (no keep-alive), so an idle
/// browser connection cannot hold up the accept loop. A zero timeout
/// disables the per-connection time limit.
///
/// If shutdown is requested meanwhile, the connection is shut down
/// gracefully: a response in progress is completed, a connection that has
/// not sent anything yet is closed at once. Returns `true` in that case,
/// since the shutdown permit has been consumed here.
pub async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    shutdown: &ShutdownSignal,
) -> bool {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(false).title_case_headers(true);

    let service_state = Arc::clone(state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );
    tokio::pin!(conn);

    let timeout = state.connection_timeout();
    let deadline = async {
        if timeout.is_zero() {
            std::future::pending::<()>().await;
        } else {
            tokio::time::sleep(timeout).await;
        }
    };
    tokio::pin!(deadline);

    let mut shutdown_requested = false;
    let result = loop {
        tokio::select! {
            res = conn.as_mut() => break Some(res),

            () = shutdown.wait(), if !shutdown_requested => {
                shutdown_requested = true;
                conn.as_mut().graceful_shutdown();
            }

            () = &mut deadline => break None,
        }
    };

    match result {
        Some(Ok(())) => {}
        Some(Err(err)) => logger::log_connection_error(&err),
        None => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout.as_secs()
            ));
        }
    }

    shutdown_requested
}
