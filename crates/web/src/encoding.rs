//! Response body compression for the negotiated content coding.

use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use reactor_http::protocol::{AcceptEncoding, ContentCoding, Response};
use tracing::warn;

/// Bodies smaller than this are not worth compressing.
const MIN_COMPRESS_BYTES: usize = 1024;

/// Compresses the response body with the coding selected during
/// `Accept-Encoding` negotiation.
///
/// Identity, `*` and compress (which has no encoder worth shipping) pass
/// through untouched, as do small bodies and responses that already carry a
/// coding. On an encoder failure the identity body is kept — a response
/// still goes out.
pub fn apply(selected: AcceptEncoding, response: &mut Response) {
    if response.coding() != ContentCoding::Identity {
        return;
    }

    if response.content().len() < MIN_COMPRESS_BYTES {
        return;
    }

    let coding = selected.coding;
    let result = match coding {
        ContentCoding::Gzip => gzip(response.content()),
        ContentCoding::Deflate => deflate(response.content()),
        ContentCoding::Brotli => brotli_encode(response.content()),
        ContentCoding::Identity | ContentCoding::Compress | ContentCoding::Any => return,
    };

    match result {
        Ok(compressed) => {
            let content_type = response.content_type().to_owned();
            response.set_content(compressed, content_type);
            response.set_coding(coding);
        }
        Err(e) => {
            warn!(coding = coding.as_str(), cause = %e, "compression failed, sending identity");
        }
    }
}

fn gzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

fn deflate(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

fn brotli_encode(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = brotli::CompressorWriter::new(Vec::new(), 4096, 5, 22);
    encoder.write_all(body)?;
    encoder.flush()?;
    Ok(encoder.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn big_response() -> Response {
        let mut response = Response::default();
        response.set_content("abc123".repeat(1000).into_bytes(), "text/plain");
        response
    }

    fn selection(coding: ContentCoding) -> AcceptEncoding {
        AcceptEncoding { coding, qvalue: 1.0 }
    }

    #[test]
    fn gzip_round_trips() {
        let mut response = big_response();
        apply(selection(ContentCoding::Gzip), &mut response);

        assert_eq!(response.coding(), ContentCoding::Gzip);
        assert!(response.content().len() < 6000);

        let mut decoder = flate2::read::GzDecoder::new(&response.content()[..]);
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc123".repeat(1000));
    }

    #[test]
    fn deflate_round_trips() {
        let mut response = big_response();
        apply(selection(ContentCoding::Deflate), &mut response);

        assert_eq!(response.coding(), ContentCoding::Deflate);

        let mut decoder = flate2::read::ZlibDecoder::new(&response.content()[..]);
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc123".repeat(1000));
    }

    #[test]
    fn brotli_round_trips() {
        let mut response = big_response();
        apply(selection(ContentCoding::Brotli), &mut response);

        assert_eq!(response.coding(), ContentCoding::Brotli);

        let mut decoder = brotli::Decompressor::new(&response.content()[..], 4096);
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc123".repeat(1000));
    }

    #[test]
    fn small_bodies_stay_identity() {
        let mut response = Response::default();
        response.set_text("tiny");

        apply(selection(ContentCoding::Gzip), &mut response);
        assert_eq!(response.coding(), ContentCoding::Identity);
        assert_eq!(&response.content()[..], b"tiny");
    }

    #[test]
    fn wildcard_and_compress_pass_through() {
        for coding in [ContentCoding::Any, ContentCoding::Compress, ContentCoding::Identity] {
            let mut response = big_response();
            apply(selection(coding), &mut response);
            assert_eq!(response.coding(), ContentCoding::Identity);
        }
    }
}
