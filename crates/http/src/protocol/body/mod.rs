//! Lazily resolved message bodies.
//!
//! The parser hands out a [`Message`](crate::protocol::Message) as soon as the head is
//! complete, while body bytes may still be in flight. The body therefore travels as a
//! single-assignment value:
//!
//! - [`BodyResolver`]: the producer side, kept by the parser. `resolve` and `fail` consume it,
//!   so a body can be assigned at most once.
//! - [`DeferredBody`]: the consumer side. It is cheap to clone, and every clone observes the
//!   same outcome.
//!
//! Dropping the resolver without assigning a value fails all waiters with
//! [`ParseError::BodyCanceled`](crate::protocol::ParseError::BodyCanceled).

mod deferred;

pub use deferred::deferred_body;
pub use deferred::BodyResolver;
pub use deferred::DeferredBody;
