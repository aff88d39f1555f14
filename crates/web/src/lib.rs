//! Routing, views, static files and content negotiation on top of the
//! `reactor-http` engine.
//!
//! Where the engine crate stops at "a parsed request and a response to
//! fill", this crate supplies the application side: a path router with
//! per-method handlers, on-disk page templates for error rendering, a static
//! file handler with a media-type table, typed form/JSON body extraction and
//! response compression for the negotiated content coding.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reactor_http::server::{Server, ServerConfig};
//! use reactor_web::{handler_fn, Router, ViewEngine};
//!
//! fn main() {
//!     let view = Arc::new(ViewEngine::builtin());
//!     let router = Router::builder()
//!         .get("/", handler_fn(|_req, _params, resp| resp.set_text("hello\r\n")))
//!         .build(view);
//!
//!     let server = Server::bind(&ServerConfig::default(), Arc::new(router)).expect("bind");
//!     server.run().expect("run");
//! }
//! ```

pub mod accept;
pub mod config;
pub mod encoding;
pub mod extract;
pub mod handler;
pub mod router;
pub mod statics;
pub mod view;

pub use config::Config;
pub use handler::{handler_fn, Handler};
pub use router::{Params, Router, RouterBuilder};
pub use statics::StaticFiles;
pub use view::{ViewEngine, ViewError};
