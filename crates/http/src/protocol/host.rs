/// Outcome of parsing the `Host` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostResult {
    Ok,
    #[default]
    Invalid,
    /// The host is acceptable but the explicit port does not match the
    /// server's bound port. Host and port stay populated so callers can
    /// still inspect them, e.g. for logging.
    Unsupported,
}

/// The parsed `Host` header.
///
/// Validation is deliberately strict same-machine-only: `localhost`,
/// `0.0.0.0` and `127.0.0.1` are the whole universe of accepted hosts. This
/// engine does not do virtual hosting.
#[derive(Debug, Clone, Default)]
pub struct Host {
    host: String,
    port: String,
    result: HostResult,
}

const ACCEPTED_HOSTS: [&str; 3] = ["localhost", "0.0.0.0", "127.0.0.1"];

impl Host {
    /// Parses a `Host` header value against the server's bound port.
    ///
    /// Without a colon the port defaults to `"80"` and is not checked. A
    /// colon as the first or last character is malformed. An explicit port
    /// different from `server_port` yields `Unsupported`.
    pub fn parse(value: &[u8], server_port: u16) -> Host {
        if value.is_empty() {
            return Host::default();
        }

        let Ok(value) = std::str::from_utf8(value) else {
            return Host::default();
        };

        let (host, port, explicit) = match value.find(':') {
            None => (value, "80", false),
            Some(0) => return Host::default(),
            Some(pos) if pos == value.len() - 1 => return Host::default(),
            Some(pos) => (&value[..pos], &value[pos + 1..], true),
        };

        if !ACCEPTED_HOSTS.contains(&host) {
            return Host::default();
        }

        let result = if explicit && port != server_port.to_string() { HostResult::Unsupported } else { HostResult::Ok };

        Host { host: host.to_owned(), port: port.to_owned(), result }
    }

    pub fn result(&self) -> HostResult {
        self.result
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}
