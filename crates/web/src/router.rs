//! Path-based route table and request dispatch.
//!
//! Routes are registered per path pattern with one handler slot per method,
//! then matched with a radix router. Dispatch is also where request-level
//! failures turn into pages: parse errors recorded by the engine, unknown
//! paths, missing method handlers and unacceptable media types all render
//! through the view engine.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use reactor_http::protocol::{Method, Request, Response};
use reactor_http::server::Service;
use tracing::debug;

use crate::accept::acceptable;
use crate::encoding;
use crate::handler::Handler;
use crate::view::ViewEngine;

/// Path parameters captured by the matched route pattern.
#[derive(Debug, Default)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-method handler slots for one route pattern.
#[derive(Default)]
pub struct RouteHandlers {
    get: Option<Box<dyn Handler>>,
    post: Option<Box<dyn Handler>>,
    put: Option<Box<dyn Handler>>,
    delete: Option<Box<dyn Handler>>,
    head: Option<Box<dyn Handler>>,
}

impl std::fmt::Debug for RouteHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteHandlers")
            .field("get", &self.get.is_some())
            .field("post", &self.post.is_some())
            .field("put", &self.put.is_some())
            .field("delete", &self.delete.is_some())
            .field("head", &self.head.is_some())
            .finish()
    }
}

impl RouteHandlers {
    /// HEAD falls back to the GET handler; the engine strips the body.
    fn for_method(&self, method: Method) -> Option<&dyn Handler> {
        let slot = match method {
            Method::Get => &self.get,
            Method::Post => &self.post,
            Method::Put => &self.put,
            Method::Delete => &self.delete,
            Method::Head => match &self.head {
                Some(_) => &self.head,
                None => &self.get,
            },
            Method::Invalid => &None,
        };
        slot.as_deref()
    }
}

/// The route table. Implements the engine's [`Service`] seam.
pub struct Router {
    inner: matchit::Router<RouteHandlers>,
    view: Arc<ViewEngine>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Router")
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<String, RouteHandlers>,
}

impl std::fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBuilder").field("routes", &self.routes.len()).finish()
    }
}

impl RouterBuilder {
    pub fn get(mut self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.routes.entry(path.into()).or_default().get = Some(Box::new(handler));
        self
    }

    pub fn post(mut self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.routes.entry(path.into()).or_default().post = Some(Box::new(handler));
        self
    }

    pub fn put(mut self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.routes.entry(path.into()).or_default().put = Some(Box::new(handler));
        self
    }

    pub fn delete(mut self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.routes.entry(path.into()).or_default().delete = Some(Box::new(handler));
        self
    }

    pub fn head(mut self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.routes.entry(path.into()).or_default().head = Some(Box::new(handler));
        self
    }

    /// Builds the router. Registering an invalid pattern is a programming
    /// error and panics at startup, before any traffic.
    pub fn build(self, view: Arc<ViewEngine>) -> Router {
        let mut inner = matchit::Router::new();
        for (path, handlers) in self.routes {
            inner.insert(path.clone(), handlers).unwrap_or_else(|e| panic!("invalid route pattern {path}: {e}"));
        }

        Router { inner, view }
    }
}

impl Service for Router {
    fn dispatch(&self, request: &Request, response: &mut Response) {
        // Parse-stage failures (400/413/505) come first; the request never
        // reaches a handler.
        if let Some(status) = request.error_status() {
            debug!(status = %status, "answering parse failure");
            self.view.render_error(response, status);
            return;
        }

        if request.method() == Method::Invalid {
            self.view.render_error(response, StatusCode::NOT_IMPLEMENTED);
            return;
        }

        let Ok(matched) = self.inner.at(request.path()) else {
            self.view.render_error(response, StatusCode::NOT_FOUND);
            return;
        };

        let Some(handler) = matched.value.for_method(request.method()) else {
            self.view.render_error(response, StatusCode::METHOD_NOT_ALLOWED);
            return;
        };

        let params = Params {
            entries: matched.params.iter().map(|(key, value)| (key.to_owned(), value.to_owned())).collect(),
        };

        handler.handle(request, &params, response);

        // A handler that signalled an error without a body gets the page
        // treatment too.
        if !response.status().is_success() && response.content().is_empty() {
            self.view.render_error(response, response.status());
            return;
        }

        if !acceptable(request.accept(), response.content_type()) {
            self.view.render_error(response, StatusCode::NOT_ACCEPTABLE);
            return;
        }

        encoding::apply(request.accept_encoding(), response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use indoc::indoc;
    use reactor_http::codec::{find_header_end, RequestDecoder};
    use reactor_http::protocol::ContentCoding;

    fn decode(raw: &str) -> Request {
        let raw = raw.replace('\n', "\r\n");
        let header = raw.as_bytes();
        let end = find_header_end(header).unwrap();
        RequestDecoder::new(8080).decode(&header[..end])
    }

    fn router() -> Router {
        Router::builder()
            .get("/", handler_fn(|_req, _params, resp| resp.set_html("<h1>home</h1>")))
            .post("/submit", handler_fn(|req, _params, resp| {
                resp.set_text(format!("got {} bytes", req.body().len()));
            }))
            .get("/items/{id}", handler_fn(|_req, params, resp| {
                resp.set_text(format!("item {}", params.get("id").unwrap_or("?")));
            }))
            .build(Arc::new(ViewEngine::builtin()))
    }

    fn dispatch(raw: &str) -> Response {
        let request = decode(raw);
        let mut response = Response::default();
        router().dispatch(&request, &mut response);
        response
    }

    #[test]
    fn matching_route_runs_its_handler() {
        let response = dispatch(indoc! {"
            GET / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::OK);
        assert!(String::from_utf8(response.content().to_vec()).unwrap().contains("home"));
    }

    #[test]
    fn path_params_reach_the_handler() {
        let response = dispatch(indoc! {"
            GET /items/42 HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(&response.content()[..], b"item 42");
    }

    #[test]
    fn unknown_path_renders_404() {
        let response = dispatch(indoc! {"
            GET /missing HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(String::from_utf8(response.content().to_vec()).unwrap().contains("404"));
    }

    #[test]
    fn wrong_method_renders_405() {
        let response = dispatch(indoc! {"
            DELETE / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn head_reuses_the_get_handler() {
        let response = dispatch(indoc! {"
            HEAD / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn unknown_verb_renders_501() {
        let response = dispatch(indoc! {"
            PATCH / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn parse_failures_render_their_status() {
        let response = dispatch(indoc! {"
            GET / HTTP/1.0
            Host: localhost:8080

        "});
        assert_eq!(response.status(), StatusCode::HTTP_VERSION_NOT_SUPPORTED);
    }

    #[test]
    fn unacceptable_media_renders_406() {
        let response = dispatch(indoc! {"
            GET / HTTP/1.1
            Host: localhost:8080
            Accept: application/json

        "});
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn negotiated_encoding_is_applied() {
        let router = Router::builder()
            .get("/big", handler_fn(|_req, _params, resp| resp.set_text("waldo".repeat(1000))))
            .build(Arc::new(ViewEngine::builtin()));

        let request = decode(indoc! {"
            GET /big HTTP/1.1
            Host: localhost:8080
            Accept-Encoding: gzip

        "});
        let mut response = Response::default();
        router.dispatch(&request, &mut response);

        assert_eq!(response.coding(), ContentCoding::Gzip);
        assert!(response.content().len() < 5000);
    }
}
