use std::process::ExitCode;
use std::sync::Arc;

use cors_serve::config::{AppState, Config};
use cors_serve::error::StartupError;
use cors_serve::{logger, server};

fn main() -> ExitCode {
    match launch() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_startup_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn launch() -> Result<(), StartupError> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let root = cfg.resolve_root()?;
    let state = Arc::new(AppState::new(root, cfg));

    // Single thread: connections are handled one at a time, in arrival order
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::run(state))
}
