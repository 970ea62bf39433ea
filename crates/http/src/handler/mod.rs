//! Request handlers invoked by [`HttpConnection`](crate::connection::HttpConnection).
//!
//! A handler receives the parsed [`Message`] as soon as its head is complete and produces
//! an [`OutgoingMessage`]. The body is still being read while the handler runs; await
//! [`DeferredBody::wait`](crate::protocol::body::DeferredBody::wait) to obtain it.

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;

use crate::protocol::{Message, OutgoingMessage};

#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>> + Send;

    async fn call(&self, message: Message) -> Result<OutgoingMessage, Self::Error>;
}

/// Adapts an async function into a [`Handler`]; see [`make_handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Message) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>> + Send,
    Fut: Future<Output = Result<OutgoingMessage, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, message: Message) -> Result<OutgoingMessage, Self::Error> {
        (self.f)(message).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<OutgoingMessage, Err>>,
    F: Fn(Message) -> Ret,
{
    HandlerFn { f }
}
