//! Incremental HTTP/1.1 message parser.
//!
//! The parser is fed with whatever chunks the transport produces and walks through:
//!
//! ```text
//! AwaitFirstLine -> AwaitHeaders -> AwaitBody -> Complete
//!        \               \              \
//!         +---------------+--------------+--> Failed
//! ```
//!
//! The head (first line and headers) is framed by a [`LineSplitter`]. Once the blank line
//! arrives the parser returns the [`Message`] right away, so a consumer can route on headers
//! while the body is still in flight. Body bytes bypass line splitting and accumulate until
//! `Content-Length` is reached, at which point the message's
//! [`DeferredBody`](crate::protocol::body::DeferredBody) resolves.
//!
//! Errors are final: the pending body fails with the same error, and every later call
//! returns it again.
//!
//! Bytes beyond `Content-Length` never reach the body. The message and its body are delivered
//! as usual, and the excess is reported as [`ParseError::LengthMismatch`] by every later
//! [`MessageParser::add_data`] and by [`MessageParser::end`], however the input was chunked.

use std::mem;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::codec::first_line::FirstLineKind;
use crate::codec::header_line::parse_header;
use crate::codec::line_splitter::LineSplitter;
use crate::ensure;
use crate::protocol::body::{BodyResolver, DeferredBody, deferred_body};
use crate::protocol::{FirstLine, HeaderList, Message, MessageHead, ParseError, PayloadSize};

/// Maximum number of headers allowed in a message
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire head section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum `Content-Length` accepted, the body is buffered in memory
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// Upper bound for the body buffer reserved up front, whatever `Content-Length` claims
const MAX_BODY_PREALLOC: u64 = 64 * 1024;

const CRLF_LEN: usize = 2;

/// Limits applied while parsing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    max_header_bytes: usize,
    max_headers: usize,
    max_body_bytes: u64,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self { max_header_bytes: MAX_HEADER_BYTES, max_headers: MAX_HEADER_NUM, max_body_bytes: MAX_BODY_BYTES }
    }

    /// Caps the first line plus all header lines, terminators included.
    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    /// Largest `Content-Length` accepted; bigger messages fail before any body byte is buffered.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[inline]
    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    #[inline]
    pub fn max_headers(&self) -> usize {
        self.max_headers
    }

    #[inline]
    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable phase of a [`MessageParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    AwaitFirstLine,
    AwaitHeaders,
    AwaitBody,
    Complete,
    Failed,
}

#[derive(Debug)]
enum State {
    FirstLine,
    Headers { first_line: FirstLine, headers: HeaderList },
    Body { expected: u64, received: BytesMut },
    /// `overrun` counts bytes received past the end of the message
    Complete { expected: u64, overrun: u64 },
    Failed(ParseError),
}

/// Parses a single HTTP/1.1 message from arbitrarily chunked input.
///
/// Calls must be serialized: one parser belongs to one connection, and `&mut self` on every
/// driving method keeps it that way.
#[derive(Debug)]
pub struct MessageParser {
    kind: FirstLineKind,
    config: ParserConfig,
    state: State,
    splitter: LineSplitter,
    head_bytes: usize,
    bytes_seen: u64,
    resolver: Option<BodyResolver>,
    body: DeferredBody,
}

impl MessageParser {
    pub fn new(kind: FirstLineKind) -> Self {
        Self::with_config(kind, ParserConfig::default())
    }

    /// A parser expecting a request line.
    pub fn request() -> Self {
        Self::new(FirstLineKind::Request)
    }

    /// A parser expecting a status line.
    pub fn response() -> Self {
        Self::new(FirstLineKind::Status)
    }

    pub fn with_config(kind: FirstLineKind, config: ParserConfig) -> Self {
        let (resolver, body) = deferred_body();
        Self {
            kind,
            config,
            state: State::FirstLine,
            splitter: LineSplitter::with_max_line_length(config.max_header_bytes),
            head_bytes: 0,
            bytes_seen: 0,
            resolver: Some(resolver),
            body,
        }
    }

    #[inline]
    pub fn kind(&self) -> FirstLineKind {
        self.kind
    }

    pub fn state(&self) -> ParserState {
        match self.state {
            State::FirstLine => ParserState::AwaitFirstLine,
            State::Headers { .. } => ParserState::AwaitHeaders,
            State::Body { .. } => ParserState::AwaitBody,
            State::Complete { .. } => ParserState::Complete,
            State::Failed(_) => ParserState::Failed,
        }
    }

    /// The body of the message being parsed, available before the head is complete.
    pub fn body(&self) -> DeferredBody {
        self.body.clone()
    }

    /// Returns true once any byte has been fed to the parser.
    #[inline]
    pub fn has_started(&self) -> bool {
        self.bytes_seen > 0
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete { .. })
    }

    /// Feeds the next chunk of input.
    ///
    /// Returns `Ok(Some(message))` exactly once, on the call that completes the head. The
    /// message body may still be pending at that point; it resolves during a later call, or
    /// immediately when the message declares no body.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] that moved the parser to [`ParserState::Failed`], and the
    /// same error on every call after that. Once the message is complete, any byte beyond its
    /// end makes this and every later call return [`ParseError::LengthMismatch`]; the state
    /// stays [`ParserState::Complete`] and the body keeps its value.
    pub fn add_data(&mut self, chunk: &[u8]) -> Result<Option<Message>, ParseError> {
        self.bytes_seen += chunk.len() as u64;

        match self.state {
            State::FirstLine | State::Headers { .. } => {
                self.splitter.add_data(chunk);
                // a message delivered here still reports its overrun on the next call or on `end`
                self.drain_lines()
            }
            State::Body { .. } => {
                self.append_body(chunk);
                self.check_overrun().map(|()| None)
            }
            State::Complete { ref mut overrun, .. } => {
                *overrun += chunk.len() as u64;
                self.check_overrun().map(|()| None)
            }
            State::Failed(ref e) => Err(e.clone()),
        }
    }

    /// Signals that no further input will arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedEof`] when the message is incomplete; the pending body
    /// fails with the same error. A complete message followed by extra bytes returns
    /// [`ParseError::LengthMismatch`] and keeps its body.
    pub fn end(&mut self) -> Result<(), ParseError> {
        let error = match &self.state {
            State::Complete { .. } => return self.check_overrun(),
            State::Failed(_) => return Ok(()),
            State::FirstLine | State::Headers { .. } => {
                ParseError::unexpected_eof(format!("stream ended after {} bytes of message head", self.bytes_seen))
            }
            State::Body { expected, received } => {
                ParseError::unexpected_eof(format!("stream ended after {} of {expected} body bytes", received.len()))
            }
        };

        Err(self.fail(error))
    }

    /// Fails a parser that has not reached a terminal state, e.g. when its connection idles out.
    ///
    /// Returns the error the parser now holds; a terminal parser keeps its outcome.
    pub fn abort(&mut self, error: ParseError) -> Option<ParseError> {
        match self.state {
            State::Complete { .. } | State::Failed(_) => None,
            _ => Some(self.fail(error)),
        }
    }

    fn drain_lines(&mut self) -> Result<Option<Message>, ParseError> {
        loop {
            let line = match self.splitter.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.fail(e)),
            };

            match self.on_line(line) {
                Ok(Some(message)) => return Ok(Some(message)),
                Ok(None) => {}
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    fn on_line(&mut self, line: String) -> Result<Option<Message>, ParseError> {
        self.head_bytes += line.len() + CRLF_LEN;
        ensure!(
            self.head_bytes <= self.config.max_header_bytes,
            ParseError::too_large_header(self.head_bytes, self.config.max_header_bytes)
        );

        // error paths leave the placeholder behind; the caller replaces it with `Failed`
        match mem::replace(&mut self.state, State::Complete { expected: 0, overrun: 0 }) {
            State::FirstLine => {
                let first_line = self.kind.parse(&line)?;
                trace!(first_line = %first_line, "parsed first line");
                self.state = State::Headers { first_line, headers: HeaderList::new() };
                Ok(None)
            }
            State::Headers { first_line, mut headers } if !line.is_empty() => {
                ensure!(headers.len() < self.config.max_headers, ParseError::too_many_headers(self.config.max_headers));
                headers.append(parse_header(&line)?);
                self.state = State::Headers { first_line, headers };
                Ok(None)
            }
            State::Headers { first_line, headers } => self.finish_head(MessageHead::new(first_line, headers)).map(Some),
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    fn finish_head(&mut self, head: MessageHead) -> Result<Message, ParseError> {
        let payload_size = head.payload_size()?;
        let seed = self.splitter.take_remaining();

        debug!(headers = head.headers().len(), payload_size = ?payload_size, "parsed message head");

        match payload_size {
            PayloadSize::Empty => {
                self.complete(0, Bytes::new(), seed.len() as u64);
            }
            PayloadSize::Length(expected) => {
                let max_size = self.config.max_body_bytes;
                ensure!(expected <= max_size, ParseError::too_large_body(expected, max_size));

                let capacity = usize::try_from(expected.min(MAX_BODY_PREALLOC)).unwrap_or_default();
                self.state = State::Body { expected, received: BytesMut::with_capacity(capacity) };
                self.append_body(&seed);
            }
        }

        Ok(Message::new(head, self.body.clone()))
    }

    /// Appends at most the missing body bytes; the rest of `chunk` counts as overrun.
    fn append_body(&mut self, chunk: &[u8]) {
        let State::Body { expected, received } = &mut self.state else {
            return;
        };

        let expected = *expected;
        let missing = usize::try_from(expected - received.len() as u64).unwrap_or(usize::MAX);
        let (body_part, excess) = chunk.split_at(missing.min(chunk.len()));

        received.extend_from_slice(body_part);
        trace!(received = received.len(), expected, "received body bytes");

        if received.len() as u64 == expected {
            let body = mem::take(received).freeze();
            self.complete(expected, body, excess.len() as u64);
        }
    }

    fn complete(&mut self, expected: u64, body: Bytes, overrun: u64) {
        self.state = State::Complete { expected, overrun };
        if let Some(resolver) = self.resolver.take() {
            resolver.resolve(body);
        }
    }

    /// Reports bytes received past the end of a complete message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LengthMismatch`] when the input ran past the message end.
    pub fn check_overrun(&self) -> Result<(), ParseError> {
        match self.state {
            State::Complete { expected, overrun } if overrun > 0 => {
                let error = ParseError::length_mismatch(expected, expected + overrun);
                warn!(cause = %error, "bytes received past the end of the message");
                Err(error)
            }
            _ => Ok(()),
        }
    }

    fn fail(&mut self, error: ParseError) -> ParseError {
        warn!(cause = %error, "message parsing failed");
        if let Some(resolver) = self.resolver.take() {
            resolver.fail(error.clone());
        }
        self.state = State::Failed(error.clone());
        error
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::request()
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use indoc::indoc;

    use super::*;
    use crate::protocol::HeaderField;

    fn crlf(text: &str) -> String {
        text.replace('\n', "\r\n")
    }

    fn hello_request() -> String {
        crlf(indoc! {"
            POST /hello?name=world HTTP/1.1
            Host: example.com
            Content-Length: 5

            hello"})
    }

    #[test]
    fn whole_message_in_one_chunk() {
        let mut parser = MessageParser::request();
        let message = parser.add_data(hello_request().as_bytes()).unwrap().unwrap();

        let line = message.head().request_line().unwrap();
        assert_eq!(line.method(), &Method::POST);
        assert_eq!(line.path(), "/hello?name=world");
        assert_eq!(line.protocol(), "HTTP/1.1");
        assert_eq!(message.head().headers().get("Host"), Some("example.com"));
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"hello"))));
        assert_eq!(parser.state(), ParserState::Complete);
    }

    #[test]
    fn head_is_returned_before_the_body_arrives() {
        let mut parser = MessageParser::request();
        let input = hello_request();
        let (head, body) = input.split_at(input.len() - 5);

        let message = parser.add_data(head.as_bytes()).unwrap().unwrap();
        assert!(message.body().is_pending());
        assert_eq!(parser.state(), ParserState::AwaitBody);

        assert!(parser.add_data(&body.as_bytes()[..3]).unwrap().is_none());
        assert!(message.body().is_pending());

        assert!(parser.add_data(&body.as_bytes()[3..]).unwrap().is_none());
        assert_eq!(message.body().wait_blocking(), Ok(Bytes::from_static(b"hello")));
    }

    #[test]
    fn byte_at_a_time() {
        let input = crlf(indoc! {"
            GET /index.html HTTP/1.1
            Host: localhost
            Accept: */*
            Content-Length: 3

            abc"});

        let mut parser = MessageParser::request();
        let mut messages = vec![];
        for (index, byte) in input.bytes().enumerate() {
            if let Some(message) = parser.add_data(&[byte]).unwrap() {
                messages.push((index, message));
            }
        }

        assert_eq!(messages.len(), 1);
        let (index, message) = &messages[0];
        assert_eq!(*index, input.len() - 4, "message is delivered on the final LF of the head");
        assert_eq!(message.head().headers().len(), 3);
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"abc"))));
    }

    #[test]
    fn bodiless_get_completes_on_the_final_byte() {
        let input = b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n";
        let mut parser = MessageParser::request();

        let (last, init) = input.split_last().unwrap();
        for byte in init {
            assert!(parser.add_data(std::slice::from_ref(byte)).unwrap().is_none());
        }
        let message = parser.add_data(std::slice::from_ref(last)).unwrap().unwrap();

        let line = message.head().request_line().unwrap();
        assert_eq!(line.method(), &Method::GET);
        assert_eq!(line.path(), "/x");
        assert_eq!(line.protocol(), "HTTP/1.1");
        let headers: Vec<_> = message.head().headers().iter().map(|f| (f.key(), f.value())).collect();
        assert_eq!(headers, vec![("Host", "h")]);
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::new())));
    }

    #[test]
    fn every_split_point_yields_the_same_message() {
        let input = hello_request();
        let bytes = input.as_bytes();

        let mut reference = MessageParser::request();
        let expected = reference.add_data(bytes).unwrap().unwrap();

        for split in 0..=bytes.len() {
            let mut parser = MessageParser::request();
            let first = parser.add_data(&bytes[..split]).unwrap();
            let second = parser.add_data(&bytes[split..]).unwrap();

            let message = match (first, second) {
                (Some(message), None) | (None, Some(message)) => message,
                other => panic!("split at {split} produced {other:?}"),
            };
            assert_eq!(message.head(), expected.head(), "split at {split}");
            assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"hello"))), "split at {split}");
        }
    }

    #[test]
    fn body_arriving_with_the_blank_line() {
        let mut parser = MessageParser::request();
        assert!(parser.add_data(b"PUT /k HTTP/1.1\r\nContent-Length: 2\r\n\r").unwrap().is_none());

        let message = parser.add_data(b"\nok").unwrap().unwrap();
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"ok"))));
    }

    #[test]
    fn missing_or_zero_content_length_means_empty_body() {
        for input in ["GET / HTTP/1.1\r\nHost: h\r\n\r\n", "GET / HTTP/1.1\r\nContent-Length: 0\r\n\r\n"] {
            let mut parser = MessageParser::request();
            let message = parser.add_data(input.as_bytes()).unwrap().unwrap();

            assert_eq!(message.body().try_get(), Some(Ok(Bytes::new())));
            assert_eq!(parser.state(), ParserState::Complete);
        }
    }

    #[test]
    fn headers_keep_order_case_and_duplicates() {
        let input = crlf(indoc! {"
            GET / HTTP/1.1
            x-trace: 1
            Accept: text/html
            X-Trace: 2
            x-trace: 3

            "});

        let mut parser = MessageParser::request();
        let message = parser.add_data(input.as_bytes()).unwrap().unwrap();
        let headers = message.head().headers();

        let keys: Vec<_> = headers.iter().map(HeaderField::key).collect();
        assert_eq!(keys, vec!["x-trace", "Accept", "X-Trace", "x-trace"]);
        assert_eq!(headers.get_all("x-trace").collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn malformed_first_line_fails_without_a_message() {
        let mut parser = MessageParser::request();
        let body = parser.body();

        assert_eq!(parser.add_data(b"GET\r\n").unwrap_err(), ParseError::first_line_syntax("GET"));
        assert_eq!(parser.state(), ParserState::Failed);
        assert_eq!(body.try_get(), Some(Err(ParseError::first_line_syntax("GET"))));

        // a failed parser replays its error whatever it is fed
        assert_eq!(parser.add_data(b"Host: h\r\n\r\n").unwrap_err(), ParseError::first_line_syntax("GET"));
        assert_eq!(parser.end(), Ok(()));
    }

    #[test]
    fn malformed_header_line() {
        let mut parser = MessageParser::request();
        assert_eq!(parser.add_data(b"GET / HTTP/1.1\r\nHost:h\r\n").unwrap_err(), ParseError::header_syntax("Host:h"));
    }

    #[test]
    fn invalid_content_length() {
        let mut parser = MessageParser::request();
        let result = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n");

        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
        assert_eq!(parser.state(), ParserState::Failed);
    }

    /// Feeds every chunk, keeping the delivered message; overrun errors are checked separately.
    fn feed(parser: &mut MessageParser, chunks: &[&[u8]]) -> Option<Message> {
        chunks.iter().filter_map(|chunk| parser.add_data(chunk).ok().flatten()).last()
    }

    #[test]
    fn overrun_is_independent_of_chunking() {
        let input: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello!";

        for split in 0..=input.len() {
            let mut parser = MessageParser::request();
            let (head, tail) = input.split_at(split);
            let message = feed(&mut parser, &[head, tail]);

            let message = message.unwrap_or_else(|| panic!("split at {split} delivered no message"));
            assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"hello"))), "split at {split}");
            assert_eq!(parser.state(), ParserState::Complete, "split at {split}");
            assert_eq!(parser.end(), Err(ParseError::length_mismatch(5, 6)), "split at {split}");
        }
    }

    #[test]
    fn overrun_in_the_head_chunk_is_reported_later() {
        let mut parser = MessageParser::request();

        let message = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nabc").unwrap().unwrap();
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"ab"))));
        assert_eq!(parser.check_overrun(), Err(ParseError::length_mismatch(2, 3)));
        assert_eq!(parser.add_data(b"").unwrap_err(), ParseError::length_mismatch(2, 3));
    }

    #[test]
    fn overrun_in_a_body_chunk() {
        let mut parser = MessageParser::request();
        let message = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\na").unwrap().unwrap();

        assert_eq!(parser.add_data(b"bc").unwrap_err(), ParseError::length_mismatch(2, 3));
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"ab"))));
        assert_eq!(parser.state(), ParserState::Complete);
    }

    #[test]
    fn trailing_bytes_after_bodiless_message() {
        let mut parser = MessageParser::request();

        let message = parser.add_data(b"GET / HTTP/1.1\r\n\r\nX").unwrap().unwrap();
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::new())));
        assert_eq!(parser.end(), Err(ParseError::length_mismatch(0, 1)));
    }

    #[test]
    fn bytes_after_completion_accumulate() {
        let mut parser = MessageParser::request();
        let message = parser.add_data(hello_request().as_bytes()).unwrap().unwrap();
        assert_eq!(parser.check_overrun(), Ok(()));

        assert_eq!(parser.add_data(b"!").unwrap_err(), ParseError::length_mismatch(5, 6));
        assert_eq!(parser.add_data(b"!!").unwrap_err(), ParseError::length_mismatch(5, 8));
        assert_eq!(parser.state(), ParserState::Complete);
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"hello"))));
    }

    #[test]
    fn body_size_is_bounded() {
        let config = ParserConfig::new().with_max_body_bytes(4);
        let mut parser = MessageParser::with_config(FirstLineKind::Request, config);
        let body = parser.body();

        let error = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\n").unwrap_err();
        assert_eq!(error, ParseError::too_large_body(5, 4));
        assert_eq!(body.try_get(), Some(Err(error)));
        assert_eq!(parser.state(), ParserState::Failed);

        let mut parser = MessageParser::with_config(FirstLineKind::Request, config);
        let message = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nabcd").unwrap().unwrap();
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"abcd"))));
    }

    #[test]
    fn end_before_completion() {
        let mut parser = MessageParser::request();
        let message = parser.add_data(b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nab").unwrap().unwrap();

        let error = parser.end().unwrap_err();
        assert!(matches!(error, ParseError::UnexpectedEof { .. }));
        assert_eq!(message.body().try_get(), Some(Err(error)));
    }

    #[test]
    fn end_after_completion() {
        let mut parser = MessageParser::request();
        parser.add_data(hello_request().as_bytes()).unwrap();

        assert_eq!(parser.end(), Ok(()));
        assert_eq!(parser.state(), ParserState::Complete);
    }

    #[test]
    fn end_on_untouched_parser() {
        let mut parser = MessageParser::request();
        assert!(!parser.has_started());
        assert!(matches!(parser.end(), Err(ParseError::UnexpectedEof { .. })));
    }

    #[test]
    fn abort_only_affects_unfinished_parsers() {
        let mut parser = MessageParser::request();
        parser.add_data(b"GET / HT").unwrap();
        assert!(parser.has_started());

        let timeout = ParseError::read_timeout(std::time::Duration::from_secs(1));
        assert_eq!(parser.abort(timeout.clone()), Some(timeout.clone()));
        assert_eq!(parser.body().try_get(), Some(Err(timeout.clone())));
        assert_eq!(parser.abort(ParseError::BodyCanceled), None);
        assert_eq!(parser.add_data(b"TP/1.1\r\n").unwrap_err(), timeout);
    }

    #[test]
    fn too_many_headers() {
        let config = ParserConfig::new().with_max_headers(2);
        let mut parser = MessageParser::with_config(FirstLineKind::Request, config);

        let result = parser.add_data(b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::too_many_headers(2));
    }

    #[test]
    fn head_size_is_bounded() {
        let config = ParserConfig::new().with_max_header_bytes(32);
        let mut parser = MessageParser::with_config(FirstLineKind::Request, config);

        assert!(parser.add_data(b"GET / HTTP/1.1\r\n").unwrap().is_none());
        assert_eq!(parser.add_data(b"X-Long: aaaaaaaaaaaaaaaa\r\n").unwrap_err(), ParseError::too_large_header(42, 32));
    }

    #[test]
    fn unterminated_line_is_bounded() {
        let config = ParserConfig::new().with_max_header_bytes(16);
        let mut parser = MessageParser::with_config(FirstLineKind::Request, config);

        let result = parser.add_data(&[b'a'; 17]);
        assert_eq!(result.unwrap_err(), ParseError::too_large_header(17, 16));
    }

    #[test]
    fn response_mode() {
        let input = crlf(indoc! {"
            HTTP/1.1 201 Created
            Content-Length: 2

            {}"});

        let mut parser = MessageParser::response();
        let message = parser.add_data(input.as_bytes()).unwrap().unwrap();

        let line = message.head().status_line().unwrap();
        assert_eq!(line.status(), StatusCode::CREATED);
        assert_eq!(line.reason(), "Created");
        assert_eq!(message.body().try_get(), Some(Ok(Bytes::from_static(b"{}"))));
    }

    #[test]
    fn response_mode_rejects_request_lines() {
        let mut parser = MessageParser::response();
        assert!(matches!(parser.add_data(b"GET / HTTP/1.1\r\n"), Err(ParseError::FirstLineSyntax { .. })));
    }
}
