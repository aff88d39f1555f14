/// Maximum accepted request-target length in bytes.
pub const MAX_URI_LENGTH: usize = 2048;

/// Outcome of parsing the request-target token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UriResult {
    Ok,
    #[default]
    Invalid,
    TooLong,
}

/// The parsed request-target.
///
/// Holds one bounded copy of the raw token; `path` and `query` are ranges
/// into that copy, so the backing storage is unambiguous and bounds-checked.
#[derive(Debug, Clone, Default)]
pub struct Uri {
    raw: Vec<u8>,
    path: (usize, usize),
    query: Option<(usize, usize)>,
    result: UriResult,
}

impl Uri {
    /// Parses a request-target token.
    ///
    /// An empty token is invalid. A token longer than [`MAX_URI_LENGTH`]
    /// yields `TooLong` without retaining any partial state. The path starts
    /// at the first `/` (or covers the whole token if there is none) and ends
    /// at the first `?`, which introduces the optional query string.
    pub fn parse(token: &[u8]) -> Uri {
        if token.is_empty() {
            return Uri::default();
        }

        if token.len() > MAX_URI_LENGTH {
            return Uri { result: UriResult::TooLong, ..Uri::default() };
        }

        let raw = token.to_vec();
        let path_start = raw.iter().position(|&b| b == b'/').unwrap_or(0);
        let query_pos = raw.iter().position(|&b| b == b'?');

        let (path_end, query) = match query_pos {
            Some(q) if q >= path_start => (q, (q + 1 < raw.len()).then(|| (q + 1, raw.len()))),
            _ => (raw.len(), None),
        };

        Uri { raw, path: (path_start, path_end), query, result: UriResult::Ok }
    }

    pub fn result(&self) -> UriResult {
        self.result
    }

    /// The raw request-target as received.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn path(&self) -> &str {
        std::str::from_utf8(&self.raw[self.path.0..self.path.1]).unwrap_or("/")
    }

    pub fn query(&self) -> Option<&str> {
        self.query.and_then(|(start, end)| std::str::from_utf8(&self.raw[start..end]).ok())
    }
}
