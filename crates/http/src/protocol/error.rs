use std::io;
use thiserror::Error;

/// Errors raised while splitting raw header bytes into lines and fields.
///
/// These are recoverable: the connection maps them to an HTTP status
/// (400/413/505) and still produces an error response through the normal
/// writer path. They never abort the process.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line: {reason}")]
    BadStartLine { reason: &'static str },

    #[error("malformed header line: {reason}")]
    BadHeaderLine { reason: &'static str },

    #[error("invalid content-length header: {reason}")]
    BadContentLength { reason: String },
}

impl ParseError {
    pub fn bad_start_line(reason: &'static str) -> Self {
        Self::BadStartLine { reason }
    }

    pub fn bad_header_line(reason: &'static str) -> Self {
        Self::BadHeaderLine { reason }
    }

    pub fn bad_content_length<S: ToString>(reason: S) -> Self {
        Self::BadContentLength { reason: reason.to_string() }
    }
}

/// Errors raised while flushing response bytes to the peer.
///
/// `WouldBlock` and peer-closed conditions are *not* represented here; the
/// writers surface those as [`crate::codec::WriteProgress`] values so the
/// reactor can re-arm or tear down. A `SendError` is fatal to the connection
/// only, never to the process.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Fatal infrastructure failures.
///
/// Everything here means the engine cannot safely continue: a listener that
/// will not bind, a poller that cannot be created, a worker pool that cannot
/// start. Callers are expected to log the diagnostic and exit.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to bind listener on {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("failed to create poller: {source}")]
    Poll { source: io::Error },

    #[error("failed to create waker: {source}")]
    Waker { source: io::Error },

    #[error("failed to register with poller: {source}")]
    Registry { source: io::Error },

    #[error("failed to spawn worker thread: {source}")]
    Spawn { source: io::Error },

    #[error("readiness wait failed: {source}")]
    Wait { source: io::Error },
}
