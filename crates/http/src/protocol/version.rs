/// Outcome of parsing the protocol-version token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionResult {
    Ok,
    #[default]
    Invalid,
    /// Well-formed, but not HTTP/1.1. The dispatcher answers 505.
    Unsupported,
}

/// The parsed protocol version.
///
/// Only the exact form `HTTP/<digit>.<digit>` is accepted; only 1.1 is
/// supported. `major`/`minor` are populated for any well-formed token so an
/// unsupported version can still be reported.
#[derive(Debug, Clone, Copy)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    result: VersionResult,
}

impl Default for Version {
    fn default() -> Self {
        Version { major: 1, minor: 1, result: VersionResult::Invalid }
    }
}

impl Version {
    pub fn parse(token: &[u8]) -> Version {
        if token.len() != 8 || !token.starts_with(b"HTTP/") || token[6] != b'.' {
            return Version::default();
        }

        let (major, minor) = (token[5], token[7]);
        if !major.is_ascii_digit() || !minor.is_ascii_digit() {
            return Version::default();
        }

        let major = major - b'0';
        let minor = minor - b'0';
        let result = if major == 1 && minor == 1 { VersionResult::Ok } else { VersionResult::Unsupported };

        Version { major, minor, result }
    }

    pub fn result(&self) -> VersionResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_1_1_is_ok() {
        let v = Version::parse(b"HTTP/1.1");
        assert_eq!(v.result(), VersionResult::Ok);
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 1);
    }

    #[test]
    fn http_1_0_is_unsupported() {
        let v = Version::parse(b"HTTP/1.0");
        assert_eq!(v.result(), VersionResult::Unsupported);
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 0);
    }

    #[test]
    fn http_2_0_is_unsupported() {
        assert_eq!(Version::parse(b"HTTP/2.0").result(), VersionResult::Unsupported);
    }

    #[test]
    fn wrong_scheme_is_invalid() {
        assert_eq!(Version::parse(b"FTP/1.0").result(), VersionResult::Invalid);
    }

    #[test]
    fn malformed_digits_are_invalid() {
        assert_eq!(Version::parse(b"HTTP/x.1").result(), VersionResult::Invalid);
        assert_eq!(Version::parse(b"HTTP/1,1").result(), VersionResult::Invalid);
        assert_eq!(Version::parse(b"HTTP/1.10").result(), VersionResult::Invalid);
        assert_eq!(Version::parse(b"HTTP/").result(), VersionResult::Invalid);
        assert_eq!(Version::parse(b"").result(), VersionResult::Invalid);
    }
}
