use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Errors raised while turning raw bytes into a [`Message`](crate::protocol::Message).
///
/// `ParseError` is `Clone` because a failed body is observed by every holder of the
/// [`DeferredBody`](crate::protocol::body::DeferredBody), and a failed parser replays
/// the same error on every later call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed first line: {line:?}")]
    FirstLineSyntax { line: String },

    #[error("malformed header: {line:?}")]
    HeaderSyntax { line: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("body length mismatch, expected {expected} bytes but received {received}")]
    LengthMismatch { expected: u64, received: u64 },

    #[error("unexpected end of stream: {reason}")]
    UnexpectedEof { reason: String },

    #[error("no data received within {idle:?}")]
    ReadTimeout { idle: Duration },

    #[error("body length {content_length} exceed the limit {max_size}")]
    TooLargeBody { content_length: u64, max_size: u64 },

    #[error("body was dropped before it was resolved")]
    BodyCanceled,

    #[error("io error: {reason}")]
    Io { reason: String },
}

/// Keeps the io error's message only, so the error stays `Clone`.
impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::Io { reason: e.to_string() }
    }
}

impl ParseError {
    pub fn first_line_syntax<S: ToString>(line: S) -> Self {
        Self::FirstLineSyntax { line: line.to_string() }
    }

    pub fn header_syntax<S: ToString>(line: S) -> Self {
        Self::HeaderSyntax { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn length_mismatch(expected: u64, received: u64) -> Self {
        Self::LengthMismatch { expected, received }
    }

    pub fn unexpected_eof<S: ToString>(str: S) -> Self {
        Self::UnexpectedEof { reason: str.to_string() }
    }

    pub fn too_large_body(content_length: u64, max_size: u64) -> Self {
        Self::TooLargeBody { content_length, max_size }
    }

    pub fn read_timeout(idle: Duration) -> Self {
        Self::ReadTimeout { idle }
    }

    /// Returns true for errors caused by the peer sending bytes that are not valid HTTP framing.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::FirstLineSyntax { .. }
                | Self::HeaderSyntax { .. }
                | Self::TooLargeHeader { .. }
                | Self::TooManyHeaders { .. }
                | Self::InvalidContentLength { .. }
                | Self::TooLargeBody { .. }
                | Self::LengthMismatch { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid message head: {reason}")]
    InvalidHead { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_head<S: ToString>(str: S) -> Self {
        Self::InvalidHead { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
