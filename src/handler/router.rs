//! Request dispatch module
//!
//! Entry point for HTTP request processing: method check, static file
//! dispatch, then the headers every response must carry.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, cors};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub method: &'a Method,
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a Method, path: &'a str, query: Option<&'a str>) -> Self {
        Self {
            method,
            path,
            query,
            is_head: *method == Method::HEAD,
        }
    }

    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self::new(req.method(), req.uri().path(), req.uri().query())
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::from_request(&req);
    let response = respond(&ctx, &state).await;

    if state.access_log() {
        log_access(&req, &response, peer_addr, &state);
    }

    Ok(response)
}

/// Produce the response for one request, CORS headers included
pub async fn respond(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let mut response = match *ctx.method {
        Method::GET | Method::HEAD => static_files::serve(ctx, state).await,
        _ => http::build_501_response(ctx.method, false),
    };

    http::response::apply_server_header(&mut response, &state.config.http.server_name);
    // Last step before hyper writes the head
    cors::apply(response.headers_mut());
    response
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    state: &AppState,
) {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method().to_string(), target);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);

    logger::log_access(&entry, state.config.logging.access_log_format);
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hyper::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        SERVER,
    };
    use hyper::StatusCode;

    fn test_state(root: &std::path::Path) -> AppState {
        let config = Config::load_from(config::Environment::with_prefix("SERVE_ROUTER_TEST")).unwrap();
        AppState::new(root.canonicalize().unwrap(), config)
    }

    fn assert_cors(response: &Response<Full<Bytes>>) {
        let headers = response.headers();
        for name in [
            ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_HEADERS,
        ] {
            assert_eq!(headers.get_all(&name).iter().count(), 1, "{name}");
        }
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn test_every_method_gets_cors_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "export {};").unwrap();
        let state = test_state(dir.path());

        for (method, path, expected) in [
            (Method::GET, "/app.js", StatusCode::OK),
            (Method::HEAD, "/app.js", StatusCode::OK),
            (Method::GET, "/missing.js", StatusCode::NOT_FOUND),
            (Method::POST, "/app.js", StatusCode::NOT_IMPLEMENTED),
            (Method::OPTIONS, "/app.js", StatusCode::NOT_IMPLEMENTED),
            (Method::PUT, "/", StatusCode::NOT_IMPLEMENTED),
        ] {
            let ctx = RequestContext::new(&method, path, None);
            let response = respond(&ctx, &state).await;
            assert_eq!(response.status(), expected, "{method} {path}");
            assert_cors(&response);
        }
    }

    #[tokio::test]
    async fn test_server_header_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let ctx = RequestContext::new(&Method::GET, "/", None);
        let response = respond(&ctx, &state).await;
        assert!(response.headers()[SERVER]
            .to_str()
            .unwrap()
            .starts_with("cors-serve/"));
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/js/fsm.js?v=1")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert!(ctx.is_head);
        assert_eq!(ctx.path, "/js/fsm.js");
        assert_eq!(ctx.query, Some("v=1"));
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}
