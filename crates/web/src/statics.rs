//! Static file serving.

use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use reactor_http::protocol::{Request, Response};
use tracing::{debug, warn};

use crate::handler::Handler;
use crate::router::Params;

/// Serves files beneath a root directory.
///
/// Mounted on a wildcard route (e.g. `/public/{*path}`); the wildcard value
/// selects the file. Traversal components are rejected before the path ever
/// touches the filesystem. Missing files produce a bare 404 that the router
/// dresses up with the error page.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> StaticFiles {
        StaticFiles { root: root.into() }
    }

    fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let rel = Path::new(rel);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return None;
        }

        Some(self.root.join(rel))
    }
}

impl Handler for StaticFiles {
    fn handle(&self, _request: &Request, params: &Params, response: &mut Response) {
        let Some(rel) = params.get("path") else {
            response.set_status(StatusCode::NOT_FOUND);
            return;
        };

        let Some(path) = self.resolve(rel) else {
            warn!(path = rel, "rejected traversal in static path");
            response.set_status(StatusCode::NOT_FOUND);
            return;
        };

        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), size = bytes.len(), "serving static file");
                response.set_content(bytes, mime_for(&path).to_string());
            }
            Err(e) => {
                debug!(path = %path.display(), cause = %e, "static file unavailable");
                response.set_status(StatusCode::NOT_FOUND);
            }
        }
    }
}

/// Extension → media type table for the file types this server ships.
fn mime_for(path: &Path) -> mime::Mime {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS,
        "js" => mime::TEXT_JAVASCRIPT,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "svg" => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_media_types() {
        assert_eq!(mime_for(Path::new("a/index.html")).as_ref(), "text/html; charset=utf-8");
        assert_eq!(mime_for(Path::new("styles.css")).as_ref(), "text/css");
        assert_eq!(mime_for(Path::new("app.js")).as_ref(), "text/javascript");
        assert_eq!(mime_for(Path::new("logo.png")).as_ref(), "image/png");
        assert_eq!(mime_for(Path::new("noext")).as_ref(), "application/octet-stream");
    }

    #[test]
    fn traversal_components_are_rejected() {
        let statics = StaticFiles::new("/srv/public");
        assert!(statics.resolve("../etc/passwd").is_none());
        assert!(statics.resolve("a/../../b").is_none());
        assert!(statics.resolve("/absolute").is_none());
        assert!(statics.resolve("css/styles.css").is_some());
    }
}
