//! Protocol types: methods, request-targets, versions, headers and the
//! request/response pair owned by each connection.
//!
//! Every parser here is total over its input: malformed bytes produce a
//! result variant (`Invalid`, `TooLong`, `Unsupported`), not a panic and not
//! a torn-down connection. The connection turns those variants into HTTP
//! error statuses and keeps going, so even a garbage request gets a proper
//! error response.

mod encoding;
mod error;
mod host;
mod media;
mod method;
mod qlist;
mod request;
mod response;
mod uri;
mod version;

pub use encoding::{parse_accept, AcceptEncoding, ContentCoding};
pub use error::{EngineError, ParseError, SendError};
pub use host::{Host, HostResult};
pub use media::MediaKind;
pub use method::Method;
pub use qlist::{QEntry, QList, MAX_VALUE_LENGTH};
pub use request::{parse_content_length, parse_header_line, Request, RequestState};
pub use response::Response;
pub use uri::{Uri, UriResult, MAX_URI_LENGTH};
pub use version::{Version, VersionResult};
