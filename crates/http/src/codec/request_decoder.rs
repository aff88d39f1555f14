use http::StatusCode;

use crate::protocol::{
    parse_accept, parse_content_length, parse_header_line, AcceptEncoding, Host, HostResult, MediaKind, Method, Request,
    RequestState, Uri, UriResult, Version, VersionResult,
};

/// Locates the `\r\n\r\n` header terminator, returning the offset of its
/// first byte.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Turns a complete header region into a [`Request`].
///
/// Decoding is total: malformed stages record an HTTP status on the request
/// (400, 413 or 505) instead of failing, and the connection serves the error
/// through the regular response path. Only the headers this engine
/// interprets — `Host`, `Accept`, `Accept-Encoding`, `Content-Length`,
/// `Content-Type` — are inspected; everything else is skipped.
#[derive(Debug, Clone)]
pub struct RequestDecoder {
    server_port: u16,
}

impl RequestDecoder {
    /// `server_port` is the listener's bound port, used to validate the
    /// `Host` header.
    pub fn new(server_port: u16) -> RequestDecoder {
        RequestDecoder { server_port }
    }

    /// Decodes the header region (everything before the `\r\n\r\n`).
    pub fn decode(&self, header: &[u8]) -> Request {
        let mut request = Request::default();
        let mut lines = Lines { rest: header };

        let Some(start_line) = lines.next() else {
            request.fail(StatusCode::BAD_REQUEST);
            return request;
        };

        self.decode_start_line(start_line, &mut request);

        request.state = RequestState::Header;
        for line in lines {
            if line.is_empty() {
                break;
            }

            let Ok((key, value)) = parse_header_line(line) else {
                request.fail(StatusCode::BAD_REQUEST);
                continue;
            };

            if key.eq_ignore_ascii_case(b"Host") {
                request.host = Host::parse(value, self.server_port);
            } else if key.eq_ignore_ascii_case(b"Accept") {
                request.accept = parse_accept(value);
            } else if key.eq_ignore_ascii_case(b"Accept-Encoding") {
                request.accept_encoding = AcceptEncoding::parse(value);
            } else if key.eq_ignore_ascii_case(b"Content-Length") {
                match parse_content_length(value) {
                    Ok(length) => request.content_length = length,
                    Err(_) => request.fail(StatusCode::BAD_REQUEST),
                }
            } else if key.eq_ignore_ascii_case(b"Content-Type") {
                request.media_kind = MediaKind::parse(value);
            }
        }

        // HTTP/1.1 requires Host; an absent or unacceptable one is a 400.
        if request.host.result() != HostResult::Ok {
            request.fail(StatusCode::BAD_REQUEST);
        }

        if request.accept.is_empty() {
            request.accept = parse_accept(b"");
        }

        request.state = RequestState::Done;
        request
    }

    /// Decodes `METHOD SP URI SP VERSION`.
    fn decode_start_line(&self, line: &[u8], request: &mut Request) {
        let mut tokens = line.split(|&b| b == b' ').filter(|t| !t.is_empty());
        let (Some(method), Some(uri), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            request.fail(StatusCode::BAD_REQUEST);
            return;
        };

        request.state = RequestState::Method;
        request.method = Method::parse(method);

        request.state = RequestState::Uri;
        request.uri = Uri::parse(uri);
        match request.uri.result() {
            UriResult::Ok => {}
            UriResult::TooLong => request.fail(StatusCode::PAYLOAD_TOO_LARGE),
            UriResult::Invalid => request.fail(StatusCode::BAD_REQUEST),
        }

        request.state = RequestState::Version;
        request.version = Version::parse(version);
        match request.version.result() {
            VersionResult::Ok => {}
            VersionResult::Unsupported => request.fail(StatusCode::HTTP_VERSION_NOT_SUPPORTED),
            VersionResult::Invalid => request.fail(StatusCode::BAD_REQUEST),
        }
    }
}

/// Iterates `\r\n`-separated lines of the header region.
struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.windows(2).position(|w| w == b"\r\n") {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 2..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = &[];
                Some(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ContentCoding;
    use indoc::indoc;

    fn decode(raw: &str) -> Request {
        let raw = raw.replace('\n', "\r\n");
        let header = raw.as_bytes();
        let end = find_header_end(header).unwrap_or(header.len());
        RequestDecoder::new(8080).decode(&header[..end])
    }

    #[test]
    fn plain_get_decodes_cleanly() {
        let request = decode(indoc! {"
            GET /index.html?foo=bar HTTP/1.1
            Host: localhost:8080
            Accept: text/html,*/*;q=0.8
            Accept-Encoding: gzip, deflate

        "});

        assert_eq!(request.error_status(), None);
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.query(), Some("foo=bar"));
        assert_eq!(request.host().host(), "localhost");
        assert_eq!(request.host().port(), "8080");
        assert_eq!(request.accept_encoding().coding, ContentCoding::Gzip);
        assert_eq!(request.accept().len(), 2);
        assert_eq!(request.state(), RequestState::Done);
    }

    #[test]
    fn post_records_length_and_media_kind() {
        let request = decode(indoc! {"
            POST /login HTTP/1.1
            Host: localhost:8080
            Content-Length: 27
            Content-Type: application/x-www-form-urlencoded

        "});

        assert_eq!(request.error_status(), None);
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.content_length(), 27);
        assert_eq!(request.media_kind(), MediaKind::Form);
    }

    #[test]
    fn uninterpreted_headers_are_skipped() {
        let request = decode(indoc! {"
            GET / HTTP/1.1
            Host: localhost:8080
            User-Agent: curl/7.79.1
            X-Custom: whatever

        "});

        assert_eq!(request.error_status(), None);
    }

    #[test]
    fn missing_host_is_bad_request() {
        let request = decode("GET / HTTP/1.1\n\n");
        assert_eq!(request.error_status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn old_version_is_505() {
        let request = decode(indoc! {"
            GET / HTTP/1.0
            Host: localhost:8080

        "});
        assert_eq!(request.error_status(), Some(StatusCode::HTTP_VERSION_NOT_SUPPORTED));
    }

    #[test]
    fn version_error_outranks_host_error() {
        let request = decode("GET / HTTP/1.0\n\n");
        assert_eq!(request.error_status(), Some(StatusCode::HTTP_VERSION_NOT_SUPPORTED));
    }

    #[test]
    fn oversized_uri_is_payload_too_large() {
        let long = "a".repeat(3000);
        let request = decode(&format!("GET /{long} HTTP/1.1\nHost: localhost:8080\n\n"));
        assert_eq!(request.error_status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[test]
    fn unknown_method_is_not_an_error_by_itself() {
        let request = decode(indoc! {"
            PATCH / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(request.method(), Method::Invalid);
        assert_eq!(request.error_status(), None);
    }

    #[test]
    fn truncated_start_line_is_bad_request() {
        let request = decode("GET /\nHost: localhost:8080\n\n");
        assert_eq!(request.error_status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn absent_accept_defaults_to_wildcard() {
        let request = decode(indoc! {"
            GET / HTTP/1.1
            Host: localhost:8080

        "});
        assert_eq!(request.accept().len(), 1);
        assert_eq!(request.accept().iter().next().unwrap().value(), "*/*");
    }
}
