//! An event-driven HTTP/1.1 server engine built on readiness multiplexing.
//!
//! This crate implements a small HTTP/1.1 server directly on non-blocking
//! sockets and a readiness poller — no application framework, no third-party
//! HTTP stack on the wire. One reactor thread drives the poll loop, accepts
//! connections and feeds parsed requests to a fixed pool of worker threads
//! through a bounded, semaphore-guarded ring; workers run application
//! dispatch and hand the connection back for the write phase.
//!
//! # Features
//!
//! - Readiness-based reactor (mio) with edge-style non-blocking I/O
//! - Incremental request parsing across any number of partial reads
//! - Bounded producer/consumer worker pool with end-to-end backpressure
//! - Stateful response writer, including resumable chunked transfer coding
//! - Weighted `Accept` / `Accept-Encoding` negotiation
//! - Structured logging via `tracing`
//!
//! # Limitations
//!
//! The parser is a deliberately restricted HTTP/1.1 subset:
//! GET/POST/PUT/DELETE/HEAD only, a fixed header budget of 8 KiB, and only
//! the `Host`, `Accept`, `Accept-Encoding`, `Content-Length` and
//! `Content-Type` headers are interpreted. Connections serve one request and
//! close; there is no keep-alive reuse, no TLS and no HTTP/2.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::StatusCode;
//! use reactor_http::protocol::{Request, Response};
//! use reactor_http::server::{Server, ServerConfig, Service};
//! use tracing::{error, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! struct Hello;
//!
//! impl Service for Hello {
//!     fn dispatch(&self, request: &Request, response: &mut Response) {
//!         if let Some(status) = request.error_status() {
//!             response.set_status(status);
//!             response.set_text(format!("{status}\r\n"));
//!             return;
//!         }
//!
//!         response.set_status(StatusCode::OK);
//!         response.set_text("Hello World!\r\n");
//!     }
//! }
//!
//! fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let config = ServerConfig::default();
//!     let server = match Server::bind(&config, Arc::new(Hello)) {
//!         Ok(server) => server,
//!         Err(e) => {
//!             error!(cause = %e, "failed to start server");
//!             return;
//!         }
//!     };
//!
//!     if let Err(e) = server.run() {
//!         error!(cause = %e, "server stopped");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - `reactor`: the readiness loop and connection lifecycle (crate-private)
//! - [`connection`]: the per-socket state machine
//! - [`protocol`]: request/response types and header parsers
//! - [`codec`]: request decoding and response/chunked encoding
//! - [`pool`]: the bounded worker pool
//! - [`server`]: configuration, bootstrap and the [`server::Service`] seam
//!
//! # Concurrency model
//!
//! Exactly one thread touches a connection at a time. The reactor owns every
//! connection while it is reading or writing; ownership moves to a single
//! worker for dispatch and then moves back. The ring and its semaphores are
//! the only shared mutable structure. If all workers are busy and the ring
//! is full, submission blocks the reactor itself — backpressure reaches from
//! pool capacity all the way to `accept()`.

pub mod codec;
pub mod connection;
pub mod pool;
pub mod protocol;
pub mod server;

mod reactor;
mod utils;
