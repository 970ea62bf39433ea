//! Wire-level codecs: line framing, incremental message parsing and message encoding.
//!
//! - [`LineSplitter`] / [`LineDecoder`]: CRLF framing over arbitrarily chunked input
//! - [`MessageParser`]: the first line, header and body state machine
//! - [`MessageEncoder`]: serializes an [`OutgoingMessage`](crate::protocol::OutgoingMessage)
//!
//! # Example
//!
//! ```
//! use relay_http::codec::MessageParser;
//!
//! let mut parser = MessageParser::request();
//! assert!(parser.add_data(b"GET /x HTTP/1.1\r\nHo").unwrap().is_none());
//!
//! let message = parser.add_data(b"st: h\r\n\r\n").unwrap().unwrap();
//! assert_eq!(message.head().headers().get("Host"), Some("h"));
//! assert_eq!(message.body().try_get(), Some(Ok(bytes::Bytes::new())));
//! ```

mod first_line;
mod header_line;
mod line_splitter;
mod message_encoder;
mod message_parser;

pub use first_line::FirstLineKind;
pub use line_splitter::{LineDecoder, LineSplitter, Lines};
pub use message_encoder::MessageEncoder;
pub use message_parser::{MessageParser, ParserConfig, ParserState};
