//! Server bootstrap: configuration, listener setup and the dispatch seam.
//!
//! Everything the engine needs lives in an explicit [`Server`] value built
//! from a [`ServerConfig`] — there is no process-wide state. Application
//! behavior plugs in through the [`Service`] trait, which a worker thread
//! invokes with the parsed request and a response to populate.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;

use mio::net::TcpListener;
use mio::{Poll, Waker};
use tracing::info;

use crate::codec::RequestDecoder;
use crate::pool::{ThreadPool, DEFAULT_WORKERS, RING_CAPACITY};
use crate::protocol::{EngineError, Request, Response};
use crate::reactor::{Reactor, WAKER};

/// Route dispatch, seen from the engine.
///
/// A worker thread calls `dispatch` exactly once per request and expects the
/// response to be populated in place — even for a failed parse (see
/// [`Request::error_status`]) the service must produce *some* response; no
/// panic may cross this boundary.
pub trait Service: Send + Sync + 'static {
    fn dispatch(&self, request: &Request, response: &mut Response);
}

impl<F> Service for F
where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
{
    fn dispatch(&self, request: &Request, response: &mut Response) {
        self(request, response);
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1`.
    pub host: String,
    /// Port to bind; `0` picks an ephemeral port.
    pub port: u16,
    /// Worker threads in the pool.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: "127.0.0.1".to_owned(), port: 8080, workers: DEFAULT_WORKERS }
    }
}

/// A bound but not yet running server.
pub struct Server {
    reactor: Reactor,
    local_addr: SocketAddr,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("local_addr", &self.local_addr).finish()
    }
}

impl Server {
    /// Binds the listener and starts the worker pool.
    ///
    /// Any failure here is fatal: a server that cannot bind, poll or spawn
    /// workers has nothing useful left to do.
    pub fn bind(config: &ServerConfig, service: Arc<dyn Service>) -> Result<Server, EngineError> {
        let addr_text = format!("{}:{}", config.host, config.port);
        let addr: SocketAddr = addr_text
            .parse()
            .map_err(|e| EngineError::Bind { addr: addr_text.clone(), source: std::io::Error::other(format!("{e}")) })?;

        let listener = TcpListener::bind(addr).map_err(|e| EngineError::Bind { addr: addr_text.clone(), source: e })?;
        let local_addr = listener.local_addr().map_err(|e| EngineError::Bind { addr: addr_text, source: e })?;
        info!(addr = %local_addr, "prepare listener... OK");

        let poll = Poll::new().map_err(|e| EngineError::Poll { source: e })?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER).map_err(|e| EngineError::Waker { source: e })?);
        info!("create poller... OK");

        let (done_tx, done_rx) = mpsc::channel();

        let pool = ThreadPool::start(config.workers, service, done_tx, waker)
            .map_err(|e| EngineError::Spawn { source: e })?;
        info!(workers = pool.worker_count(), queue = RING_CAPACITY, "start worker pool... OK");

        let decoder = RequestDecoder::new(local_addr.port());
        let reactor = Reactor::new(poll, listener, decoder, pool, done_rx)?;

        Ok(Server { reactor, local_addr })
    }

    /// The address actually bound; useful with port `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Enters the readiness loop. Only a fatal poller failure returns.
    pub fn run(self) -> Result<(), EngineError> {
        info!(addr = %self.local_addr, "listening");
        self.reactor.run()
    }
}
