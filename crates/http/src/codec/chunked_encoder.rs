use std::io::Write;

use bytes::{Bytes, BytesMut};

use crate::codec::{flush, WriteProgress};
use crate::protocol::SendError;

/// Largest amount of body bytes framed into a single chunk.
pub const MAX_CHUNK_SIZE: usize = 10 * 1024;

/// The fixed terminal chunk closing every chunked body.
const TERMINAL_CHUNK: &[u8] = b"0\r\n\r\n";

/// Sub-states of the chunked response writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    NotStarted,
    SendingHeaders,
    SendingBody,
    SendingTerminator,
    Done,
}

/// Streams a body as chunked transfer coding across non-blocking writes.
///
/// The body is framed one chunk at a time as `<hex-length>\r\n<bytes>\r\n`,
/// at most [`MAX_CHUNK_SIZE`] body bytes per chunk, and each frame is
/// flushed completely before the next one is built. `body_offset` tracks how
/// much of the body has been framed and `sent` how much of the current frame
/// (or header block, or terminator) is on the wire, so a short write resumes
/// exactly where it stopped — the encoder never blocks and never loses or
/// duplicates a byte.
#[derive(Debug)]
pub struct ChunkedEncoder {
    state: ChunkState,
    header: BytesMut,
    body: Bytes,
    body_offset: usize,
    chunk: BytesMut,
    sent: usize,
}

impl ChunkedEncoder {
    /// Creates an encoder over a serialized header block and the body it
    /// announces.
    pub fn new(header: BytesMut, body: Bytes) -> ChunkedEncoder {
        ChunkedEncoder { state: ChunkState::NotStarted, header, body, body_offset: 0, chunk: BytesMut::new(), sent: 0 }
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Drives the writer as far as the socket allows.
    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<WriteProgress, SendError> {
        loop {
            match self.state {
                ChunkState::NotStarted => {
                    self.state = ChunkState::SendingHeaders;
                    self.sent = 0;
                }

                ChunkState::SendingHeaders => {
                    let header = std::mem::take(&mut self.header);
                    match flush(writer, &header, &mut self.sent)? {
                        WriteProgress::Complete => {
                            self.state = ChunkState::SendingBody;
                            self.sent = 0;
                        }
                        progress => {
                            self.header = header;
                            return Ok(progress);
                        }
                    }
                }

                ChunkState::SendingBody => {
                    if self.chunk.is_empty() && self.body_offset == self.body.len() {
                        self.state = ChunkState::SendingTerminator;
                        self.sent = 0;
                        continue;
                    }

                    if self.chunk.is_empty() {
                        self.frame_next_chunk();
                    }

                    let chunk = std::mem::take(&mut self.chunk);
                    match flush(writer, &chunk, &mut self.sent)? {
                        WriteProgress::Complete => {
                            self.sent = 0;
                        }
                        progress => {
                            self.chunk = chunk;
                            return Ok(progress);
                        }
                    }
                }

                ChunkState::SendingTerminator => match flush(writer, TERMINAL_CHUNK, &mut self.sent)? {
                    WriteProgress::Complete => self.state = ChunkState::Done,
                    progress => return Ok(progress),
                },

                ChunkState::Done => return Ok(WriteProgress::Complete),
            }
        }
    }

    /// Frames up to [`MAX_CHUNK_SIZE`] body bytes into the chunk buffer.
    fn frame_next_chunk(&mut self) {
        let remaining = self.body.len() - self.body_offset;
        let size = remaining.min(MAX_CHUNK_SIZE);

        self.chunk.extend_from_slice(format!("{size:x}\r\n").as_bytes());
        self.chunk.extend_from_slice(&self.body[self.body_offset..self.body_offset + size]);
        self.chunk.extend_from_slice(b"\r\n");

        self.body_offset += size;
        self.sent = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// A writer that accepts `budget` bytes, then reports would-block once.
    struct Throttled {
        out: Vec<u8>,
        budget: usize,
        blocked: usize,
    }

    impl Throttled {
        fn new(budget: usize) -> Throttled {
            Throttled { out: Vec::new(), budget, blocked: 0 }
        }
    }

    impl Write for Throttled {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                self.blocked += 1;
                self.budget = 997;
                return Err(io::Error::from(io::ErrorKind::WouldBlock));
            }
            let n = buf.len().min(self.budget);
            self.out.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Strips chunk framing and the terminal chunk, returning the body.
    fn dechunk(mut bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            let line_end = bytes.windows(2).position(|w| w == b"\r\n").expect("chunk size line");
            let size = usize::from_str_radix(std::str::from_utf8(&bytes[..line_end]).unwrap(), 16).unwrap();
            bytes = &bytes[line_end + 2..];
            if size == 0 {
                assert_eq!(bytes, &b"\r\n"[..], "terminal chunk must end the stream");
                return body;
            }
            body.extend_from_slice(&bytes[..size]);
            assert_eq!(&bytes[size..size + 2], &b"\r\n"[..]);
            bytes = &bytes[size + 2..];
        }
    }

    fn sample_body(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn round_trip_reproduces_the_body() {
        let body = sample_body(MAX_CHUNK_SIZE * 2 + 37);
        let mut encoder = ChunkedEncoder::new(BytesMut::from(&b"HTTP/1.1 200 OK\r\n\r\n"[..]), Bytes::from(body.clone()));

        let mut writer = Throttled::new(usize::MAX);
        assert_eq!(encoder.write(&mut writer).unwrap(), WriteProgress::Complete);
        assert_eq!(encoder.state(), ChunkState::Done);

        let header_end = b"HTTP/1.1 200 OK\r\n\r\n".len();
        assert_eq!(dechunk(&writer.out[header_end..]), body);
    }

    #[test]
    fn would_block_mid_chunk_resumes_without_loss() {
        let body = sample_body(MAX_CHUNK_SIZE * 2 + 37);
        let mut encoder = ChunkedEncoder::new(BytesMut::from(&b"X\r\n\r\n"[..]), Bytes::from(body.clone()));

        // First budget runs dry in the middle of the first chunk.
        let mut writer = Throttled::new(MAX_CHUNK_SIZE / 2 + 11);

        let mut rounds = 0;
        loop {
            match encoder.write(&mut writer).unwrap() {
                WriteProgress::Complete => break,
                WriteProgress::Again => rounds += 1,
                WriteProgress::Closed => panic!("peer never closed"),
            }
            assert!(rounds < 1000, "writer must make progress");
        }

        assert!(writer.blocked > 0, "test must actually hit would-block");
        assert_eq!(dechunk(&writer.out[5..]), body);
    }

    #[test]
    fn empty_body_is_just_the_terminator() {
        let mut encoder = ChunkedEncoder::new(BytesMut::from(&b"H\r\n\r\n"[..]), Bytes::new());
        let mut writer = Throttled::new(usize::MAX);
        assert_eq!(encoder.write(&mut writer).unwrap(), WriteProgress::Complete);
        assert_eq!(&writer.out[5..], &b"0\r\n\r\n"[..]);
    }
}
