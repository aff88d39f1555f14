//! The readiness-multiplexing loop.
//!
//! One reactor thread owns the poller, the listener and every connection's
//! interest registration. It blocks only inside the readiness wait: all
//! socket I/O is non-blocking and a would-block is an ordinary "come back
//! later" value, never a stall. When a request is fully parsed the
//! connection is moved out of the reactor and into the worker pool; the
//! worker moves it back over a channel and rings the waker, and the reactor
//! re-arms it for writability. That explicit ownership transfer replaces the
//! shared mutable pointers the epoll data field would otherwise smuggle
//! between threads.

use std::collections::HashMap;
use std::io;
use std::sync::mpsc::Receiver;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use crate::codec::RequestDecoder;
use crate::connection::{ConnState, Connection, ReadOutcome, WriteOutcome};
use crate::pool::{Task, ThreadPool};
use crate::protocol::EngineError;

/// Token of the listening socket.
pub(crate) const LISTENER: Token = Token(0);
/// Token of the cross-thread waker.
pub(crate) const WAKER: Token = Token(1);
/// First token handed to an accepted connection.
const FIRST_CONNECTION: usize = 2;

/// Readiness events drained per wait.
pub const MAX_EVENTS: usize = 1024;

pub(crate) struct Reactor {
    poll: Poll,
    listener: TcpListener,
    decoder: RequestDecoder,
    pool: ThreadPool,
    done: Receiver<Connection>,
    connections: HashMap<Token, Connection>,
    next_token: usize,
}

impl Reactor {
    pub(crate) fn new(
        poll: Poll,
        mut listener: TcpListener,
        decoder: RequestDecoder,
        pool: ThreadPool,
        done: Receiver<Connection>,
    ) -> Result<Reactor, EngineError> {
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(|e| EngineError::Registry { source: e })?;

        Ok(Reactor { poll, listener, decoder, pool, done, connections: HashMap::new(), next_token: FIRST_CONNECTION })
    }

    /// Runs the event loop forever (or until the poller fails fatally).
    pub(crate) fn run(mut self) -> Result<(), EngineError> {
        let mut events = Events::with_capacity(MAX_EVENTS);

        loop {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(EngineError::Wait { source: e });
            }

            // Completed tasks first, so a writability event arriving in the
            // same batch finds its connection already re-armed.
            self.collect_finished();

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_ready(),
                    WAKER => {} // finished tasks were collected above
                    token => {
                        if event.is_readable() {
                            self.read_ready(token);
                        } else if event.is_writable() {
                            self.write_ready(token);
                        } else if event.is_read_closed() || event.is_write_closed() || event.is_error() {
                            self.teardown(token);
                        }
                    }
                }
            }
        }
    }

    /// Accepts until the listener would block.
    fn accept_ready(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    let mut connection = Connection::new(token, stream, peer);
                    if let Err(e) = connection.register_readable(self.poll.registry()) {
                        warn!(peer = %peer, cause = %e, "failed to register connection");
                        continue;
                    }

                    info!(peer = %peer, token = token.0, "new connection");
                    self.connections.insert(token, connection);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(cause = %e, "accept failed");
                    return;
                }
            }
        }
    }

    fn read_ready(&mut self, token: Token) {
        let Some(connection) = self.connections.get_mut(&token) else {
            return;
        };

        match connection.on_readable(&self.decoder) {
            ReadOutcome::Continue => {}
            ReadOutcome::Submit => {
                let mut connection = self.connections.remove(&token).expect("connection exists");
                if let Err(e) = connection.deregister(self.poll.registry()) {
                    warn!(token = token.0, cause = %e, "failed to deregister for handoff");
                }
                // May block on the free-slot semaphore: a full queue
                // backpressures the whole readiness loop.
                self.pool.submit(Task { connection });
            }
            ReadOutcome::Closed => self.teardown(token),
        }
    }

    fn write_ready(&mut self, token: Token) {
        let Some(connection) = self.connections.get_mut(&token) else {
            return;
        };

        match connection.on_writable() {
            WriteOutcome::Again => {}
            WriteOutcome::Flushed => {
                debug!(token = token.0, "response flushed");
                self.teardown(token);
            }
            WriteOutcome::Closed => self.teardown(token),
        }
    }

    /// Picks up connections finished by worker threads and re-arms them.
    fn collect_finished(&mut self) {
        while let Ok(mut connection) = self.done.try_recv() {
            let token = connection.token();

            if connection.state() != ConnState::WritingResponse {
                debug!(token = token.0, "dropping connection flagged for close");
                drop(connection);
                continue;
            }

            if let Err(e) = connection.register_writable(self.poll.registry()) {
                warn!(token = token.0, cause = %e, "failed to re-arm for write");
                continue;
            }

            self.connections.insert(token, connection);
        }
    }

    /// Deregisters and drops a connection; dropping closes the socket.
    fn teardown(&mut self, token: Token) {
        let Some(mut connection) = self.connections.remove(&token) else {
            return;
        };

        if let Err(e) = connection.deregister(self.poll.registry()) {
            debug!(token = token.0, cause = %e, "deregister on close failed");
        }

        connection.set_state(ConnState::Closed);
        info!(peer = %connection.peer(), token = token.0, "connection closed");
    }
}
