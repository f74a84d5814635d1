//! Logger module
//!
//! - Lifecycle messages (banner, shutdown, startup failures) always on stdout
//! - Access logging in the configured format
//! - Error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AccessLogFormat, Config};
use crate::error::StartupError;

/// Initialize the log sinks
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => eprintln!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Banner printed once the listener is bound
pub fn log_server_start(port: u16, entry_point: &str) {
    println!("Server running at http://localhost:{port}/");
    println!(
        "Open: http://localhost:{port}/{}",
        entry_point.trim_start_matches('/')
    );
    println!("Press Ctrl+C to stop the server");
}

pub fn log_server_stopped() {
    println!("\nServer stopped.");
}

pub fn log_startup_failure(err: &StartupError) {
    if err.is_port_in_use() {
        println!("{err}");
    } else {
        println!("Error starting server: {err}");
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    write_access(&entry.format(format));
}
