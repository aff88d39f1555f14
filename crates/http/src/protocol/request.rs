use bytes::Bytes;
use http::StatusCode;

use crate::protocol::encoding::AcceptEncoding;
use crate::protocol::host::Host;
use crate::protocol::method::Method;
use crate::protocol::qlist::QList;
use crate::protocol::uri::Uri;
use crate::protocol::version::Version;
use crate::protocol::ParseError;
use crate::utils::ensure;

/// Parse progress of a request, mirroring the order the wire is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Ready,
    Method,
    Uri,
    Version,
    Header,
    Body,
    Done,
}

/// One parsed HTTP request.
///
/// A request is exclusively owned by its connection and lives exactly as
/// long as it does. Parse failures do not discard the request: the offending
/// stage records an HTTP status in `error` and the connection still serves
/// an error response through the regular writer path.
#[derive(Debug, Default)]
pub struct Request {
    pub(crate) state: RequestState,
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) version: Version,
    pub(crate) host: Host,
    pub(crate) accept: QList,
    pub(crate) accept_encoding: AcceptEncoding,
    pub(crate) content_length: usize,
    pub(crate) media_kind: super::MediaKind,
    pub(crate) body: Bytes,
    pub(crate) error: Option<StatusCode>,
}

impl Request {
    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn accept(&self) -> &QList {
        &self.accept
    }

    pub fn accept_encoding(&self) -> AcceptEncoding {
        self.accept_encoding
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    pub fn media_kind(&self) -> super::MediaKind {
        self.media_kind
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Attaches the body. The connection calls this once the declared
    /// `Content-Length` bytes have arrived.
    pub fn set_body(&mut self, body: Bytes) {
        self.body = body;
        self.state = RequestState::Done;
    }

    /// The HTTP status a parse stage recorded, if any. The first recorded
    /// error wins; later stages cannot overwrite it.
    pub fn error_status(&self) -> Option<StatusCode> {
        self.error
    }

    pub(crate) fn fail(&mut self, status: StatusCode) {
        self.error.get_or_insert(status);
    }
}

/// Splits one header line at the first `": "` into key and value.
///
/// The colon must be present, must not be the first or last character, and
/// must be followed by exactly one space introducing a non-empty value.
pub fn parse_header_line(line: &[u8]) -> Result<(&[u8], &[u8]), ParseError> {
    let colon = line.iter().position(|&b| b == b':').ok_or(ParseError::bad_header_line("missing colon"))?;

    ensure!(colon > 0, ParseError::bad_header_line("empty key"));
    ensure!(colon < line.len() - 1, ParseError::bad_header_line("empty value"));
    ensure!(line[colon + 1] == b' ', ParseError::bad_header_line("no space after colon"));

    let value = &line[colon + 2..];
    ensure!(!value.is_empty(), ParseError::bad_header_line("empty value"));

    Ok((&line[..colon], value))
}

/// Parses a `Content-Length` value. Absent or empty means no body.
pub fn parse_content_length(value: &[u8]) -> Result<usize, ParseError> {
    if value.is_empty() {
        return Ok(0);
    }

    let text = std::str::from_utf8(value).map_err(|_| ParseError::bad_content_length("value is not ascii"))?;
    text.trim_ascii().parse::<usize>().map_err(|_| ParseError::bad_content_length(format!("value {text} is not a length")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_line_splits_on_colon_space() {
        let (key, value) = parse_header_line(b"Host: localhost:8080").unwrap();
        assert_eq!(key, b"Host");
        assert_eq!(value, b"localhost:8080");
    }

    #[test]
    fn header_line_rejects_malformed_input() {
        assert!(parse_header_line(b"no colon here").is_err());
        assert!(parse_header_line(b": leading").is_err());
        assert!(parse_header_line(b"trailing:").is_err());
        assert!(parse_header_line(b"Key:value").is_err());
        assert!(parse_header_line(b"Key: ").is_err());
    }

    #[test]
    fn content_length_defaults_to_zero() {
        assert_eq!(parse_content_length(b"").unwrap(), 0);
        assert_eq!(parse_content_length(b"42").unwrap(), 42);
        assert_eq!(parse_content_length(b" 17 ").unwrap(), 17);
        assert!(parse_content_length(b"nan").is_err());
        assert!(parse_content_length(b"-1").is_err());
    }

    #[test]
    fn first_recorded_error_wins() {
        let mut request = Request::default();
        request.fail(StatusCode::PAYLOAD_TOO_LARGE);
        request.fail(StatusCode::BAD_REQUEST);
        assert_eq!(request.error_status(), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }
}
