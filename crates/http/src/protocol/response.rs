use bytes::Bytes;
use http::StatusCode;

use crate::protocol::encoding::ContentCoding;

/// One response under construction.
///
/// Handlers populate status, content and content type; the worker thread
/// then serializes the whole thing through the codec. A response is plain
/// data — all write-progress state (offsets, chunk framing) lives in the
/// codec so a handler can never observe a half-sent response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    content: Bytes,
    content_type: String,
    coding: ContentCoding,
    force_chunked: bool,
}

impl Default for Response {
    fn default() -> Self {
        Response {
            status: StatusCode::OK,
            content: Bytes::new(),
            content_type: "text/plain".to_owned(),
            coding: ContentCoding::Identity,
            force_chunked: false,
        }
    }
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Replaces the body and its media type in one step.
    pub fn set_content(&mut self, content: impl Into<Bytes>, content_type: impl Into<String>) {
        self.content = content.into();
        self.content_type = content_type.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_content(text.into(), "text/plain;charset=utf-8");
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.set_content(html.into(), "text/html;charset=utf-8");
    }

    /// The content coding already applied to `content`. Emitted as the
    /// `Content-Encoding` header when it is not identity.
    pub fn coding(&self) -> ContentCoding {
        self.coding
    }

    pub fn set_coding(&mut self, coding: ContentCoding) {
        self.coding = coding;
    }

    /// Forces chunked framing even for a small body. Bodies larger than one
    /// chunk are framed chunked regardless.
    pub fn set_chunked(&mut self) {
        self.force_chunked = true;
    }

    pub fn chunked_forced(&self) -> bool {
        self.force_chunked
    }
}
