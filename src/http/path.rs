//! Request path translation
//!
//! Turns a raw request target into a path relative to the served root.
//! Confinement is lexical: `..` can never climb above the root, but
//! symbolic links found under the root are followed wherever they point.

use std::path::{Component, Path, PathBuf};

/// A request path decoded and normalized against the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    /// Decoded path (query and fragment removed), used for display
    decoded: String,
    trailing_slash: bool,
}

impl RequestPath {
    /// Decode and normalize a raw request target
    pub fn parse(raw: &str) -> Self {
        let without_query = raw.split(['?', '#']).next().unwrap_or_default();
        let decoded =
            String::from_utf8_lossy(&urlencoding::decode_binary(without_query.as_bytes()))
                .into_owned();

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other if is_plain_component(other) => segments.push(other.to_string()),
                _ => {}
            }
        }

        Self {
            trailing_slash: decoded.trim_end().ends_with('/'),
            segments,
            decoded,
        }
    }

    /// Filesystem path of this request under `root`
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }

    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    pub const fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }
}

/// True when the segment is one ordinary name on this platform
/// (rejects drive prefixes and embedded separators on Windows)
fn is_plain_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
