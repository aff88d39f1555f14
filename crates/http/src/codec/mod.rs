//! Wire codecs: incremental request decoding and stateful response
//! encoding.
//!
//! Both directions are built around non-blocking sockets. The decoder is fed
//! whatever bytes the reactor managed to read and reports whether a complete
//! header section has arrived; the encoders flush as much as the socket will
//! take and hand back a [`WriteProgress`] instead of blocking, so a
//! would-block condition always returns control to the reactor with resume
//! offsets intact.

mod chunked_encoder;
mod request_decoder;
mod response_encoder;

pub use chunked_encoder::{ChunkState, ChunkedEncoder, MAX_CHUNK_SIZE};
pub use request_decoder::{find_header_end, RequestDecoder};
pub use response_encoder::{ResponseEncoder, Wire};

use std::io::{self, Write};

use crate::protocol::SendError;

/// How far a non-blocking write got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteProgress {
    /// Everything flushed; the connection can move on.
    Complete,
    /// The socket would block; re-arm for writability and resume later.
    Again,
    /// The peer is gone; tear the connection down without further writes.
    Closed,
}

/// Flushes `buf[*sent..]`, advancing `sent` as bytes are accepted.
///
/// Would-block and peer-closed conditions come back as values; every other
/// I/O error is fatal to the connection and surfaces as a [`SendError`].
pub(crate) fn flush<W: Write>(writer: &mut W, buf: &[u8], sent: &mut usize) -> Result<WriteProgress, SendError> {
    while *sent < buf.len() {
        match writer.write(&buf[*sent..]) {
            Ok(0) => return Ok(WriteProgress::Closed),
            Ok(n) => *sent += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(WriteProgress::Again),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe || e.kind() == io::ErrorKind::ConnectionReset => {
                return Ok(WriteProgress::Closed);
            }
            Err(e) => return Err(SendError::io(e)),
        }
    }

    Ok(WriteProgress::Complete)
}
