//! Static file serving module
//!
//! Maps a request path onto the served root: files are returned as-is,
//! directories get a trailing-slash redirect, an index file, or a listing.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, RequestPath};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

const FILE_NOT_FOUND: &str = "File not found";

/// Serve a GET or HEAD request from the root directory
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let request_path = RequestPath::parse(ctx.path);
    let fs_path = request_path.resolve(state.root());

    // Follows symbolic links
    let Ok(metadata) = fs::metadata(&fs_path).await else {
        return http::build_404_response(FILE_NOT_FOUND, ctx.is_head);
    };

    if metadata.is_dir() {
        if !ctx.path.ends_with('/') {
            return http::build_redirect_response(&directory_redirect_target(ctx));
        }
        if let Some(index) = find_index_file(&fs_path, &state.config.http.index_files).await {
            return serve_file(&index, ctx.is_head).await;
        }
        return listing::serve_listing(&fs_path, &request_path, ctx.is_head).await;
    }

    if request_path.has_trailing_slash() {
        return http::build_404_response(FILE_NOT_FOUND, ctx.is_head);
    }
    serve_file(&fs_path, ctx.is_head).await
}

/// Read a file and build the 200 response for it
async fn serve_file(path: &Path, is_head: bool) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(content) => http::build_file_response(content, mime::content_type_for(path), is_head),
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                logger::log_warning(&format!("Failed to read file '{}': {e}", path.display()));
            }
            http::build_404_response(FILE_NOT_FOUND, is_head)
        }
    }
}

/// First configured index file that exists as a regular file
async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

/// Same path with a trailing slash, query string preserved
fn directory_redirect_target(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(query) => format!("{}/?{query}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}
