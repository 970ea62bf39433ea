//! Serves a single HTTP/1.1 request over any async byte stream.
//!
//! - [`HttpConnection`]: reads and parses the request, runs the handler while the body is
//!   still arriving, writes the response and closes the stream
//! - [`ConnectionConfig`]: idle timeout, read buffer size and head limits

mod http_connection;

pub use http_connection::{ConnectionConfig, HttpConnection};
