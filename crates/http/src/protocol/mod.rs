//! Core HTTP protocol types shared by the parser, the encoder and the connection.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): first lines, heads and messages
//!   - [`FirstLine`]: a [`RequestLine`] or a [`StatusLine`]
//!   - [`MessageHead`]: first line plus the ordered [`HeaderList`]
//!   - [`Message`]: a parsed head paired with its [`DeferredBody`](body::DeferredBody)
//!   - [`OutgoingMessage`]: a head with a materialized body, ready for encoding
//!
//! - **Headers** ([`header`]): [`HeaderList`] keeps fields in wire order, duplicates included
//!
//! - **Body** ([`body`]): single-assignment body values resolved by the parser
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Message parsing errors
//!   - [`SendError`]: Message sending errors

mod message;
pub use message::FirstLine;
pub use message::Message;
pub use message::MessageHead;
pub use message::OutgoingMessage;
pub use message::PayloadSize;
pub use message::RequestLine;
pub use message::StatusLine;

pub mod header;
pub use header::HeaderField;
pub use header::HeaderList;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
