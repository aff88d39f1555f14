//! Typed request-body extraction.

use http::StatusCode;
use reactor_http::protocol::{MediaKind, Request};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported media type, expected {expected}")]
    UnsupportedMediaType { expected: &'static str },

    #[error("malformed payload: {reason}")]
    Malformed { reason: String },
}

impl ExtractError {
    /// The HTTP status this failure maps to (415 or 400).
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractError::Malformed { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// An `application/x-www-form-urlencoded` body deserialized into `T`.
#[derive(Debug)]
pub struct Form<T>(pub T);

impl<T: DeserializeOwned> Form<T> {
    pub fn from_request(request: &Request) -> Result<Form<T>, ExtractError> {
        if request.media_kind() != MediaKind::Form {
            return Err(ExtractError::UnsupportedMediaType { expected: "application/x-www-form-urlencoded" });
        }

        serde_urlencoded::from_bytes(request.body())
            .map(Form)
            .map_err(|e| ExtractError::Malformed { reason: e.to_string() })
    }
}

/// An `application/json` body deserialized into `T`.
#[derive(Debug)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> Json<T> {
    pub fn from_request(request: &Request) -> Result<Json<T>, ExtractError> {
        if request.media_kind() != MediaKind::Json {
            return Err(ExtractError::UnsupportedMediaType { expected: "application/json" });
        }

        serde_json::from_slice(request.body()).map(Json).map_err(|e| ExtractError::Malformed { reason: e.to_string() })
    }
}
