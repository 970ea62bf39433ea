//! Serializes an [`OutgoingMessage`] back to wire bytes.
//!
//! Headers are written verbatim and in order; the encoder never adds or rewrites
//! `Content-Length`. Callers that build responses by hand can use
//! [`OutgoingMessage::status_only`] or set the header themselves.

use std::io;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Encoder;

use crate::ensure;
use crate::protocol::{HeaderField, MessageHead, OutgoingMessage, SendError};

/// Initial buffer size reserved for the message head
const INIT_HEAD_SIZE: usize = 4 * 1024;

/// Writes a first line, the header lines, a blank line and the raw body.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageEncoder;

impl MessageEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes `message` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Encoder::encode`].
    pub fn to_bytes(message: OutgoingMessage) -> Result<Bytes, SendError> {
        let mut dst = BytesMut::new();
        Self.encode(message, &mut dst)?;
        Ok(dst.freeze())
    }

    fn encode_head(head: &MessageHead, dst: &mut BytesMut) -> Result<(), SendError> {
        let first_line = head.first_line().to_string();
        ensure!(!contains_line_break(&first_line), SendError::invalid_head(format!("first line {first_line:?} contains CR or LF")));
        write!(FastWrite(dst), "{first_line}\r\n")?;

        for field in head.headers() {
            validate_field(field)?;
            dst.put_slice(field.key().as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(field.value().as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<OutgoingMessage> for MessageEncoder {
    type Error = SendError;

    /// # Errors
    ///
    /// Returns [`SendError::InvalidHead`] when the first line or a header contains CR or LF, or
    /// when a header has an empty key. Nothing is written to `dst` in that case.
    fn encode(&mut self, item: OutgoingMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, body) = item.into_parts();

        let start = dst.len();
        dst.reserve(INIT_HEAD_SIZE + body.len());
        if let Err(e) = Self::encode_head(&head, dst) {
            dst.truncate(start);
            return Err(e);
        }

        dst.put_slice(&body);
        Ok(())
    }
}

fn validate_field(field: &HeaderField) -> Result<(), SendError> {
    ensure!(!field.key().is_empty(), SendError::invalid_head("header with empty name"));
    ensure!(
        !contains_line_break(field.key()) && !contains_line_break(field.value()),
        SendError::invalid_head(format!("header {:?} contains CR or LF", field.key()))
    );
    Ok(())
}

#[inline]
fn contains_line_break(text: &str) -> bool {
    text.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use indoc::indoc;

    use super::*;
    use crate::codec::MessageParser;
    use crate::protocol::{HeaderList, RequestLine, StatusLine};

    #[test]
    fn encodes_status_line_headers_and_body() {
        let mut headers = HeaderList::new();
        headers.push("Content-Type", "text/plain");
        headers.push("Content-Length", "5");
        let message = OutgoingMessage::new(MessageHead::new(StatusLine::http11(StatusCode::OK), headers), "hello");

        let bytes = MessageEncoder::to_bytes(message).unwrap();

        let expected = indoc! {"
            HTTP/1.1 200 OK
            Content-Type: text/plain
            Content-Length: 5

            hello"}
        .replace('\n', "\r\n");
        assert_eq!(&bytes[..], expected.as_bytes());
    }

    #[test]
    fn status_only_message() {
        let bytes = MessageEncoder::to_bytes(OutgoingMessage::status_only(StatusCode::BAD_REQUEST)).unwrap();
        assert_eq!(&bytes[..], b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn appends_after_existing_content() {
        let mut dst = BytesMut::from(&b"prefix|"[..]);
        MessageEncoder.encode(OutgoingMessage::status_only(StatusCode::NO_CONTENT), &mut dst).unwrap();

        assert!(dst.starts_with(b"prefix|HTTP/1.1 204 No Content\r\n"));
    }

    #[test]
    fn rejects_header_injection() {
        let mut headers = HeaderList::new();
        headers.push("X-Evil", "a\r\nSet-Cookie: x=1");
        let message = OutgoingMessage::new(MessageHead::new(StatusLine::http11(StatusCode::OK), headers), "");

        let mut dst = BytesMut::from(&b"kept"[..]);
        let result = MessageEncoder.encode(message, &mut dst);

        assert!(matches!(result, Err(SendError::InvalidHead { .. })));
        assert_eq!(&dst[..], b"kept");
    }

    #[test]
    fn parse_reproduces_an_encoded_request() {
        let mut headers = HeaderList::new();
        headers.push("Host", "example.com");
        headers.push("X-Tag", "a");
        headers.push("X-Tag", "b");
        headers.push("Content-Length", "11");
        let head = MessageHead::new(RequestLine::new(Method::PUT, "/items/7?force=1", "HTTP/1.1"), headers);

        let bytes = MessageEncoder::to_bytes(OutgoingMessage::new(head.clone(), "hello world")).unwrap();

        let mut parser = MessageParser::request();
        let mut parsed = None;
        for byte in &bytes {
            if let Some(message) = parser.add_data(std::slice::from_ref(byte)).unwrap() {
                parsed = Some(message);
            }
        }

        let message = parsed.unwrap();
        assert_eq!(message.head(), &head);
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"hello world"))));
    }
}
