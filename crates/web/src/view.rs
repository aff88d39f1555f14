//! On-disk page templates.
//!
//! Templates are loaded once at startup: a base layout plus one generic page
//! each for 4xx and 5xx responses. A missing file falls back to a built-in
//! minimal page so the server can always render an error; any other read
//! failure is a startup error.

use std::io;
use std::path::{Path, PathBuf};

use http::StatusCode;
use reactor_http::protocol::Response;
use thiserror::Error;
use tracing::{info, warn};

/// Marker replaced by page content in the base layout.
const CONTENT_MARKER: &str = "{{ content }}";
/// Markers replaced in error pages.
const CODE_MARKER: &str = "{{ code }}";
const REASON_MARKER: &str = "{{ reason }}";

const DEFAULT_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<body>\n{{ content }}\n</body>\n</html>\n";
const DEFAULT_ERROR_PAGE: &str = "<h1>{{ code }} {{ reason }}</h1>\n";

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("failed to load template {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// The loaded template set.
#[derive(Debug, Clone)]
pub struct ViewEngine {
    base: String,
    page_4xx: String,
    page_5xx: String,
}

impl ViewEngine {
    /// Loads `_template.html`, `_4xx.html` and `_5xx.html` from `dir`.
    pub fn load(dir: &Path) -> Result<ViewEngine, ViewError> {
        let base = load_or_default(&dir.join("_template.html"), DEFAULT_TEMPLATE)?;
        let page_4xx = load_or_default(&dir.join("_4xx.html"), DEFAULT_ERROR_PAGE)?;
        let page_5xx = load_or_default(&dir.join("_5xx.html"), DEFAULT_ERROR_PAGE)?;

        info!(dir = %dir.display(), "load views... OK");
        Ok(ViewEngine { base, page_4xx, page_5xx })
    }

    /// A view engine built purely from the built-in pages.
    pub fn builtin() -> ViewEngine {
        ViewEngine {
            base: DEFAULT_TEMPLATE.to_owned(),
            page_4xx: DEFAULT_ERROR_PAGE.to_owned(),
            page_5xx: DEFAULT_ERROR_PAGE.to_owned(),
        }
    }

    /// Renders content into the base layout.
    pub fn render(&self, content: &str) -> String {
        self.base.replace(CONTENT_MARKER, content)
    }

    /// Renders the generic error page for `status` into `response`.
    pub fn render_error(&self, response: &mut Response, status: StatusCode) {
        let page = if status.is_server_error() { &self.page_5xx } else { &self.page_4xx };

        let reason = status.canonical_reason().unwrap_or("Unknown");
        let body = page.replace(CODE_MARKER, status.as_str()).replace(REASON_MARKER, reason);

        response.set_status(status);
        response.set_html(self.render(&body));
    }
}

fn load_or_default(path: &Path, fallback: &str) -> Result<String, ViewError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "template missing, using built-in page");
            Ok(fallback.to_owned())
        }
        Err(e) => Err(ViewError::Io { path: path.to_owned(), source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_content() {
        let view = ViewEngine::builtin();
        let html = view.render("<p>hi</p>");
        assert!(html.contains("<p>hi</p>"));
        assert!(!html.contains(CONTENT_MARKER));
    }

    #[test]
    fn error_pages_carry_code_and_reason() {
        let view = ViewEngine::builtin();
        let mut response = Response::default();

        view.render_error(&mut response, StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("404"));
        assert!(body.contains("Not Found"));
        assert_eq!(response.content_type(), "text/html;charset=utf-8");
    }

    #[test]
    fn server_errors_use_the_5xx_page() {
        let mut view = ViewEngine::builtin();
        view.page_5xx = "oops {{ code }}".to_owned();
        let mut response = Response::default();

        view.render_error(&mut response, StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("oops 500"));
    }
}
