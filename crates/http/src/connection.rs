//! Per-socket connection state machine.
//!
//! A connection owns its socket, its single fixed-capacity buffer and the
//! request/response pair — nothing here is shared. Ownership moves from the
//! reactor thread to exactly one worker thread and back; no two phases of
//! the same connection ever run concurrently.

use std::io::Read;
use std::net::SocketAddr;

use bytes::BytesMut;
use http::StatusCode;
use mio::net::TcpStream;
use mio::{Interest, Registry, Token};
use tracing::{debug, warn};

use crate::codec::{find_header_end, RequestDecoder, ResponseEncoder, Wire, WriteProgress};
use crate::protocol::{Method, Request, RequestState, Response};
use crate::server::Service;

/// Largest header section accepted before the request is failed with 413.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Largest request body accepted, same failure mode.
pub const MAX_BODY_BYTES: usize = 8 * 1024;

/// Lifecycle states of a connection.
///
/// Transitions are strictly sequential per connection:
/// `Ready → ReadingHeader → [ReadingBody →] ServingRequest →
/// WritingResponse → Closing → Closed`, with `Closing` reachable from any
/// state on error or peer hangup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Ready,
    ReadingHeader,
    ReadingBody,
    ServingRequest,
    WritingResponse,
    Closing,
    Closed,
}

/// What a readability event produced.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// More bytes are needed; wait for the next readiness event.
    Continue,
    /// A complete request (or a failed parse worth answering) is ready for
    /// the worker pool.
    Submit,
    /// The peer disappeared; tear the connection down.
    Closed,
}

/// What a writability event produced.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The response is fully flushed; close the connection.
    Flushed,
    /// The socket would block; wait for the next writability event.
    Again,
    /// The peer disappeared mid-write.
    Closed,
}

/// One accepted socket and everything owned on its behalf.
#[derive(Debug)]
pub struct Connection {
    token: Token,
    stream: TcpStream,
    peer: SocketAddr,
    state: ConnState,
    buffer: BytesMut,
    header_end: usize,
    body_start: usize,
    request: Request,
    response: Response,
    wire: Option<Wire>,
}

impl Connection {
    pub(crate) fn new(token: Token, stream: TcpStream, peer: SocketAddr) -> Connection {
        Connection {
            token,
            stream,
            peer,
            state: ConnState::Ready,
            buffer: BytesMut::with_capacity(MAX_HEADER_BYTES + MAX_BODY_BYTES),
            header_end: 0,
            body_start: 0,
            request: Request::default(),
            response: Response::default(),
            wire: None,
        }
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Offset of the `\r\n\r\n` header terminator, once found.
    pub fn header_end(&self) -> usize {
        self.header_end
    }

    /// Offset where the body region begins, once the header is complete.
    pub fn body_start(&self) -> usize {
        self.body_start
    }

    pub(crate) fn set_state(&mut self, state: ConnState) {
        self.state = state;
    }

    /// Drains the socket until it would block, advancing the parse.
    ///
    /// Multiple readiness events may be needed for one request; every call
    /// appends to the same buffer and re-checks for the `\r\n\r\n` boundary,
    /// so no assumption is made about how much one read delivers.
    pub(crate) fn on_readable(&mut self, decoder: &RequestDecoder) -> ReadOutcome {
        if self.state == ConnState::Ready {
            self.state = ConnState::ReadingHeader;
        }

        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    // Zero-length read: the peer closed before completing a
                    // request. Nothing to answer.
                    debug!(peer = %self.peer, "connection closed by peer");
                    self.state = ConnState::Closing;
                    return ReadOutcome::Closed;
                }
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    if let Some(outcome) = self.advance(decoder) {
                        return outcome;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return ReadOutcome::Continue,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(peer = %self.peer, cause = %e, "read failed");
                    self.state = ConnState::Closing;
                    return ReadOutcome::Closed;
                }
            }
        }
    }

    /// Re-examines the buffer after new bytes arrived.
    fn advance(&mut self, decoder: &RequestDecoder) -> Option<ReadOutcome> {
        match self.state {
            ConnState::ReadingHeader => {
                let Some(end) = find_header_end(&self.buffer) else {
                    if self.buffer.len() > MAX_HEADER_BYTES {
                        // Terminator never showed up within the buffer
                        // budget. Fatal to the request, not the process.
                        self.request.fail(StatusCode::PAYLOAD_TOO_LARGE);
                        return Some(self.submit());
                    }
                    return None;
                };

                self.header_end = end;
                self.body_start = end + 4;
                self.request = decoder.decode(&self.buffer[..end]);

                let wants_body =
                    self.request.error_status().is_none() && self.request.method().allows_body() && self.request.content_length() > 0;

                if !wants_body {
                    return Some(self.submit());
                }

                if self.request.content_length() > MAX_BODY_BYTES {
                    self.request.fail(StatusCode::PAYLOAD_TOO_LARGE);
                    return Some(self.submit());
                }

                self.state = ConnState::ReadingBody;
                self.request.state = RequestState::Body;
                self.body_complete()
            }

            ConnState::ReadingBody => self.body_complete(),

            // A submitted connection is never driven by the reactor; stray
            // events for other states are ignored.
            _ => None,
        }
    }

    fn body_complete(&mut self) -> Option<ReadOutcome> {
        let available = self.buffer.len() - self.body_start;
        if available < self.request.content_length() {
            return None;
        }

        let body = self.buffer.split_off(self.body_start).freeze();
        let body = body.slice(..self.request.content_length());
        self.request.set_body(body);

        Some(self.submit())
    }

    fn submit(&mut self) -> ReadOutcome {
        self.state = ConnState::ServingRequest;
        ReadOutcome::Submit
    }

    /// Runs application dispatch and serializes the response. Worker-thread
    /// side of the lifecycle.
    pub(crate) fn serve(&mut self, service: &dyn Service) {
        if self.state != ConnState::ServingRequest {
            warn!(peer = %self.peer, state = ?self.state, "connection is not ready to serve");
            self.state = ConnState::Closing;
            return;
        }

        debug!(
            peer = %self.peer,
            method = %self.request.method(),
            path = %self.request.path(),
            "serving request"
        );

        service.dispatch(&self.request, &mut self.response);

        let head_only = self.request.method() == Method::Head;
        self.wire = Some(ResponseEncoder::encode(&self.response, head_only));
        self.state = ConnState::WritingResponse;
    }

    /// Resumes the response writer. Each writability event picks up exactly
    /// where the last would-block left off.
    pub(crate) fn on_writable(&mut self) -> WriteOutcome {
        if self.state != ConnState::WritingResponse {
            self.state = ConnState::Closing;
            return WriteOutcome::Closed;
        }

        let Some(wire) = self.wire.as_mut() else {
            self.state = ConnState::Closing;
            return WriteOutcome::Closed;
        };

        match wire.write(&mut self.stream) {
            Ok(WriteProgress::Complete) => {
                self.state = ConnState::Closing;
                WriteOutcome::Flushed
            }
            Ok(WriteProgress::Again) => WriteOutcome::Again,
            Ok(WriteProgress::Closed) => {
                debug!(peer = %self.peer, "peer closed during response write");
                self.state = ConnState::Closing;
                WriteOutcome::Closed
            }
            Err(e) => {
                warn!(peer = %self.peer, cause = %e, "response write failed");
                self.state = ConnState::Closing;
                WriteOutcome::Closed
            }
        }
    }

    pub(crate) fn register_readable(&mut self, registry: &Registry) -> std::io::Result<()> {
        registry.register(&mut self.stream, self.token, Interest::READABLE)
    }

    pub(crate) fn register_writable(&mut self, registry: &Registry) -> std::io::Result<()> {
        registry.register(&mut self.stream, self.token, Interest::WRITABLE)
    }

    pub(crate) fn deregister(&mut self, registry: &Registry) -> std::io::Result<()> {
        registry.deregister(&mut self.stream)
    }
}
