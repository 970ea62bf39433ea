use std::fmt;

use bytes::Bytes;
use http::{Method, StatusCode};

use crate::protocol::body::DeferredBody;
use crate::protocol::header::{CONTENT_LENGTH, HeaderList};
use crate::protocol::ParseError;

/// `METHOD SP PATH SP PROTOCOL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    path: String,
    protocol: String,
}

impl RequestLine {
    pub fn new(method: Method, path: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self { method, path: path.into(), protocol: protocol.into() }
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as received, query string included.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.protocol)
    }
}

/// `PROTOCOL SP 3DIGIT SP REASON`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    protocol: String,
    status: StatusCode,
    reason: String,
}

impl StatusLine {
    pub fn new(protocol: impl Into<String>, status: StatusCode, reason: impl Into<String>) -> Self {
        Self { protocol: protocol.into(), status, reason: reason.into() }
    }

    /// Builds an `HTTP/1.1` status line using the canonical reason phrase of `status`.
    pub fn http11(status: StatusCode) -> Self {
        Self::new("HTTP/1.1", status, status.canonical_reason().unwrap_or("Unknown"))
    }

    #[inline]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.protocol, self.status.as_str(), self.reason)
    }
}

/// The first line of a message: a request line or a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstLine {
    Request(RequestLine),
    Status(StatusLine),
}

impl fmt::Display for FirstLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirstLine::Request(line) => line.fmt(f),
            FirstLine::Status(line) => line.fmt(f),
        }
    }
}

impl From<RequestLine> for FirstLine {
    fn from(line: RequestLine) -> Self {
        Self::Request(line)
    }
}

impl From<StatusLine> for FirstLine {
    fn from(line: StatusLine) -> Self {
        Self::Status(line)
    }
}

/// Represents the size information of an HTTP payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

/// First line plus header list, final once the blank line has been seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHead {
    first_line: FirstLine,
    headers: HeaderList,
}

impl MessageHead {
    pub fn new(first_line: impl Into<FirstLine>, headers: HeaderList) -> Self {
        Self { first_line: first_line.into(), headers }
    }

    #[inline]
    pub fn first_line(&self) -> &FirstLine {
        &self.first_line
    }

    #[inline]
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        match &self.first_line {
            FirstLine::Request(line) => Some(line),
            FirstLine::Status(_) => None,
        }
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        match &self.first_line {
            FirstLine::Status(line) => Some(line),
            FirstLine::Request(_) => None,
        }
    }

    /// Determines the body size from the header literally named `Content-Length`.
    ///
    /// Only the first such header is consulted. A missing header or a value of zero both mean
    /// the message has no body.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidContentLength`] when the value is not a decimal `u64`.
    pub fn payload_size(&self) -> Result<PayloadSize, ParseError> {
        let Some(value) = self.headers.get(CONTENT_LENGTH) else {
            return Ok(PayloadSize::Empty);
        };

        let length = value
            .trim()
            .parse::<u64>()
            .map_err(|_e| ParseError::invalid_content_length(format!("value {value} is not u64")))?;

        Ok(if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) })
    }

    pub fn into_parts(self) -> (FirstLine, HeaderList) {
        (self.first_line, self.headers)
    }
}

/// A parsed message: the head is final, the body resolves later.
#[derive(Debug, Clone)]
pub struct Message {
    head: MessageHead,
    body: DeferredBody,
}

impl Message {
    pub fn new(head: MessageHead, body: DeferredBody) -> Self {
        Self { head, body }
    }

    #[inline]
    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    /// The lazily resolved body; await [`DeferredBody::wait`] to obtain the bytes.
    #[inline]
    pub fn body(&self) -> &DeferredBody {
        &self.body
    }

    pub fn into_parts(self) -> (MessageHead, DeferredBody) {
        (self.head, self.body)
    }
}

/// A fully materialized message ready to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    head: MessageHead,
    body: Bytes,
}

impl OutgoingMessage {
    pub fn new(head: MessageHead, body: impl Into<Bytes>) -> Self {
        Self { head, body: body.into() }
    }

    /// A bodiless `HTTP/1.1` response carrying only `status` and `Content-Length: 0`.
    pub fn status_only(status: StatusCode) -> Self {
        let mut headers = HeaderList::with_capacity(1);
        headers.push(CONTENT_LENGTH, "0");
        Self::new(MessageHead::new(StatusLine::http11(status), headers), Bytes::new())
    }

    #[inline]
    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (MessageHead, Bytes) {
        (self.head, self.body)
    }
}
