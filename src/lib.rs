//! Local static file server for browser ES module development.
//!
//! Serves a directory over plain HTTP on port 8000 and stamps every response
//! with permissive CORS headers, so module scripts load without
//! cross-origin errors during local testing.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
