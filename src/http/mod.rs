//! HTTP protocol layer module
//!
//! Protocol-level helpers decoupled from the file serving logic.

pub mod cors;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use path::RequestPath;
pub use response::{
    build_404_response, build_501_response, build_error_response, build_file_response,
    build_html_response, build_redirect_response,
};
