use std::io::Write;
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};

use crate::codec::chunked_encoder::{ChunkedEncoder, MAX_CHUNK_SIZE};
use crate::codec::{flush, WriteProgress};
use crate::protocol::{ContentCoding, Response, SendError};

/// Serializes a [`Response`] into its wire representation.
///
/// Bodies that fit in a single chunk are sent with `Content-Length` as one
/// contiguous buffer; larger (or explicitly chunked) bodies go through the
/// [`ChunkedEncoder`]. Either way the result is a [`Wire`] value holding all
/// resume state for partial, non-blocking writes.
#[derive(Debug)]
pub struct ResponseEncoder;

/// Name reported in the `Server` header.
const SERVER_NAME: &str = concat!("reactor-http/", env!("CARGO_PKG_VERSION"));

impl ResponseEncoder {
    /// Builds the complete wire state for a response.
    ///
    /// `head_only` suppresses the body (HEAD requests) while keeping the
    /// headers — including the `Content-Length` the body would have had.
    pub fn encode(response: &Response, head_only: bool) -> Wire {
        let body = response.content().clone();
        let chunked = !head_only && (response.chunked_forced() || body.len() > MAX_CHUNK_SIZE);

        let mut header = BytesMut::with_capacity(256);
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown");

        header.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", status.as_u16(), reason).as_bytes());
        header.extend_from_slice(format!("Server: {SERVER_NAME}\r\n").as_bytes());
        header.extend_from_slice(format!("Date: {}\r\n", httpdate::fmt_http_date(SystemTime::now())).as_bytes());
        header.extend_from_slice(format!("Content-Type: {}\r\n", response.content_type()).as_bytes());

        if response.coding() != ContentCoding::Identity {
            header.extend_from_slice(format!("Content-Encoding: {}\r\n", response.coding().as_str()).as_bytes());
        }

        if chunked {
            header.extend_from_slice(b"Transfer-Encoding: chunked\r\n");
        } else {
            header.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        }

        header.extend_from_slice(b"Connection: close\r\n\r\n");

        if chunked {
            Wire::Chunked(ChunkedEncoder::new(header, body))
        } else {
            if !head_only {
                header.extend_from_slice(&body);
            }
            Wire::Fixed { buf: header, sent: 0 }
        }
    }
}

/// Serialized response bytes plus the progress needed to resume a send.
#[derive(Debug)]
pub enum Wire {
    /// Status line, headers and body in one buffer with an advancing offset.
    Fixed { buf: BytesMut, sent: usize },
    /// Chunked framing with its own sub-state machine.
    Chunked(ChunkedEncoder),
}

impl Wire {
    /// Flushes as much as the socket accepts, preserving resume state on a
    /// would-block.
    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<WriteProgress, SendError> {
        match self {
            Wire::Fixed { buf, sent } => flush(writer, buf, sent),
            Wire::Chunked(encoder) => encoder.write(writer),
        }
    }
}
