//! Pipeline steps.
//!
//! A [`Middleware`] receives the shared [`Request`] and [`Response`] by mutable reference and
//! decides, through [`Flow`], whether the pipeline goes on. Built-in steps, in the order a
//! typical pipeline runs them:
//!
//! - [`CommonHeaderDecoder`]: `Content-Length` and `Content-Type` onto the request
//! - [`QueryStringDecoder`]: query string into ordered parameters
//! - [`CookieDecoder`]: `Cookie` header into individual cookies
//! - [`SessionMiddleware`]: attaches a [`Session`](crate::session::Session), issuing a cookie for new ones
//! - [`BodyDecoder`]: waits for the body and decodes it by content type

mod body_decoder;
mod common_header;
mod cookie;
mod query_string;
mod session;

pub use body_decoder::BodyDecoder;
pub use common_header::CommonHeaderDecoder;
pub use cookie::CookieDecoder;
pub use query_string::QueryStringDecoder;
pub use session::SessionMiddleware;

use async_trait::async_trait;

use crate::error::MiddlewareError;
use crate::request::Request;
use crate::response::Response;

/// Whether the pipeline proceeds after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The step finalized the response; later steps are skipped.
    Halt,
}

impl Flow {
    #[inline]
    pub fn is_continue(self) -> bool {
        matches!(self, Flow::Continue)
    }
}

impl From<bool> for Flow {
    fn from(proceed: bool) -> Self {
        if proceed { Flow::Continue } else { Flow::Halt }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: &mut Request, response: &mut Response) -> Result<Flow, MiddlewareError>;
}

/// A synchronous closure used as a pipeline step; see [`middleware_fn`].
#[derive(Debug)]
pub struct FnMiddleware<F> {
    f: F,
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Flow, MiddlewareError> + Send + Sync,
{
    async fn handle(&self, request: &mut Request, response: &mut Response) -> Result<Flow, MiddlewareError> {
        (self.f)(request, response)
    }
}

pub fn middleware_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response) -> Result<Flow, MiddlewareError> + Send + Sync,
{
    FnMiddleware { f }
}

#[cfg(test)]
pub(crate) mod test_support {
    use relay_http::protocol::body::DeferredBody;
    use relay_http::protocol::{HeaderList, RequestLine};

    use crate::request::Request;

    pub(crate) fn request_with(target: &str, headers: &[(&str, &str)], body: DeferredBody) -> Request {
        Request::new(
            RequestLine::new(http::Method::POST, target, "HTTP/1.1"),
            headers.iter().copied().collect::<HeaderList>(),
            body,
        )
    }
}
