use crate::protocol::qlist::QList;

/// Content codings recognized in `Accept-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
    Compress,
    Any,
}

impl ContentCoding {
    fn parse(token: &str) -> Option<ContentCoding> {
        match token {
            "identity" => Some(ContentCoding::Identity),
            "gzip" => Some(ContentCoding::Gzip),
            "deflate" => Some(ContentCoding::Deflate),
            "br" => Some(ContentCoding::Brotli),
            "compress" => Some(ContentCoding::Compress),
            "*" => Some(ContentCoding::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCoding::Identity => "identity",
            ContentCoding::Gzip => "gzip",
            ContentCoding::Deflate => "deflate",
            ContentCoding::Brotli => "br",
            ContentCoding::Compress => "compress",
            ContentCoding::Any => "*",
        }
    }
}

/// The single coding selected from an `Accept-Encoding` header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptEncoding {
    pub coding: ContentCoding,
    pub qvalue: f32,
}

impl Default for AcceptEncoding {
    fn default() -> Self {
        AcceptEncoding { coding: ContentCoding::Identity, qvalue: 1.0 }
    }
}

impl AcceptEncoding {
    /// Reduces an `Accept-Encoding` value to the single best coding.
    ///
    /// Tokens are comma-separated; each may carry a `;q=` parameter. A token
    /// whose qvalue is malformed or outside [0,1] is excluded outright. The
    /// winner is the token with the strictly greatest valid qvalue, so ties
    /// keep the first-seen token. With no valid token at all the selection
    /// falls back to identity at 1.0.
    pub fn parse(value: &[u8]) -> AcceptEncoding {
        let Ok(value) = std::str::from_utf8(value) else {
            return AcceptEncoding::default();
        };

        let mut best: Option<AcceptEncoding> = None;

        for token in value.split(',') {
            let Some((name, qvalue)) = split_qvalue(token) else {
                continue;
            };

            let Some(coding) = ContentCoding::parse(name) else {
                continue;
            };

            if best.is_none_or(|b| qvalue > b.qvalue) {
                best = Some(AcceptEncoding { coding, qvalue });
            }
        }

        best.unwrap_or_default()
    }
}

/// Parses an `Accept` header into a weighted preference list.
///
/// Same tokenization as `Accept-Encoding`, but every valid token lands in
/// the list (default weight 1.0) instead of being reduced to one winner. An
/// absent or empty header yields a single `*/*` entry at 1.0.
pub fn parse_accept(value: &[u8]) -> QList {
    let mut list = QList::new();

    if let Ok(value) = std::str::from_utf8(value) {
        for token in value.split(',') {
            let Some((name, qvalue)) = split_qvalue(token) else {
                continue;
            };
            list.add(name, qvalue);
        }
    }

    if list.is_empty() {
        list.add("*/*", 1.0);
    }

    list
}

/// Splits one token into `(name, qvalue)`, defaulting the qvalue to 1.0.
///
/// Returns `None` for an empty name or a `q=` clause that is malformed or
/// out of range; such tokens are excluded from consideration.
fn split_qvalue(token: &str) -> Option<(&str, f32)> {
    let mut parts = token.split(';');
    let name = parts.next()?.trim_ascii();

    if name.is_empty() {
        return None;
    }

    let Some(param) = parts.next() else {
        return Some((name, 1.0));
    };

    let qvalue = param.trim_ascii().strip_prefix("q=")?.parse::<f32>().ok()?;
    (0.0..=1.0).contains(&qvalue).then_some((name, qvalue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_header_falls_back_to_identity() {
        let selected = AcceptEncoding::parse(b"");
        assert_eq!(selected.coding, ContentCoding::Identity);
        assert_eq!(selected.qvalue, 1.0);
    }

    #[test]
    fn unknown_token_falls_back_to_identity() {
        let selected = AcceptEncoding::parse(b"zzip");
        assert_eq!(selected.coding, ContentCoding::Identity);
        assert_eq!(selected.qvalue, 1.0);
    }

    #[test]
    fn single_tokens_select_their_coding() {
        assert_eq!(AcceptEncoding::parse(b"gzip").coding, ContentCoding::Gzip);
        assert_eq!(AcceptEncoding::parse(b"deflate").coding, ContentCoding::Deflate);
        assert_eq!(AcceptEncoding::parse(b"br").coding, ContentCoding::Brotli);
        assert_eq!(AcceptEncoding::parse(b"compress").coding, ContentCoding::Compress);
        assert_eq!(AcceptEncoding::parse(b"*").coding, ContentCoding::Any);
    }

    #[test]
    fn first_token_wins_ties() {
        let selected = AcceptEncoding::parse(b"deflate, gzip");
        assert_eq!(selected.coding, ContentCoding::Deflate);
        assert_eq!(selected.qvalue, 1.0);

        let selected = AcceptEncoding::parse(b"deflate;q=0.5, gzip;q=0.5");
        assert_eq!(selected.coding, ContentCoding::Deflate);
        assert_eq!(selected.qvalue, 0.5);
    }

    #[test]
    fn greatest_qvalue_wins() {
        let selected = AcceptEncoding::parse(b"gzip;q=0.5, deflate;q=0.8, br;q=1.0, *;q=0.9");
        assert_eq!(selected.coding, ContentCoding::Brotli);
        assert_eq!(selected.qvalue, 1.0);
    }

    #[test]
    fn extra_spaces_after_commas_are_skipped() {
        let selected = AcceptEncoding::parse(b"compress,   gzip, deflate");
        assert_eq!(selected.coding, ContentCoding::Compress);
    }

    #[test]
    fn out_of_range_qvalue_discards_the_token() {
        let selected = AcceptEncoding::parse(b"gzip;q=1.5");
        assert_eq!(selected.coding, ContentCoding::Identity);
        assert_eq!(selected.qvalue, 1.0);

        let selected = AcceptEncoding::parse(b"gzip;q=-0.1");
        assert_eq!(selected.coding, ContentCoding::Identity);
        assert_eq!(selected.qvalue, 1.0);
    }

    #[test]
    fn malformed_qvalue_discards_the_token() {
        let selected = AcceptEncoding::parse(b"gzip;q=abc, deflate;q=0.4");
        assert_eq!(selected.coding, ContentCoding::Deflate);
        assert_eq!(selected.qvalue, 0.4);
    }

    #[test]
    fn accept_list_keeps_every_valid_token() {
        let list = parse_accept(b"text/html,application/xml;q=0.9,*/*;q=0.8");
        let values: Vec<&str> = list.iter().map(|e| e.value()).collect();
        assert_eq!(values, ["text/html", "application/xml", "*/*"]);
    }

    #[test]
    fn absent_accept_header_is_wildcard() {
        let list = parse_accept(b"");
        assert_eq!(list.len(), 1);
        let entry = list.iter().next().unwrap();
        assert_eq!(entry.value(), "*/*");
        assert_eq!(entry.weight(), 1.0);
    }
}
