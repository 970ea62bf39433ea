//! Incremental HTTP/1.1 message parsing
//!
//! This crate reconstructs HTTP/1.1 messages from a byte stream that may be delivered in
//! arbitrarily small or misaligned chunks. The message head is handed out as soon as the blank
//! line arrives; the body follows as a [`DeferredBody`](protocol::body::DeferredBody) that
//! resolves once `Content-Length` bytes have been received.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use relay_http::connection::HttpConnection;
//! use relay_http::handler::make_handler;
//! use relay_http::protocol::{HeaderList, Message, MessageHead, OutgoingMessage, ParseError, StatusLine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(echo));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = Arc::clone(&handler);
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             match HttpConnection::new(reader, writer).process(handler).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!(cause = %e, "service has error, connection shutdown"),
//!             }
//!         });
//!     }
//! }
//!
//! async fn echo(message: Message) -> Result<OutgoingMessage, ParseError> {
//!     let body = message.body().wait().await?;
//!
//!     let mut headers = HeaderList::new();
//!     headers.push("Content-Length", body.len().to_string());
//!     Ok(OutgoingMessage::new(MessageHead::new(StatusLine::http11(StatusCode::OK), headers), body))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: line framing, the [`MessageParser`](codec::MessageParser) state machine and the
//!   [`MessageEncoder`](codec::MessageEncoder)
//! - [`protocol`]: message types, headers, deferred bodies and errors
//! - [`connection`]: drives a parser and a handler over an async byte stream
//! - [`handler`]: the [`Handler`](handler::Handler) trait and [`make_handler`](handler::make_handler)
//!
//! # Limitations
//!
//! - HTTP/1.1 framing with `Content-Length` bodies only; no chunked transfer encoding
//! - One request per connection
//! - Maximum head size: 8KB, maximum number of headers: 64 (both configurable)

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
