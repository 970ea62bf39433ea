use async_trait::async_trait;
use relay_http::protocol::header::COOKIE;

use crate::cookie::decode_cookie_header;
use crate::error::MiddlewareError;
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Splits every `Cookie` header, in order, into the request's cookie list.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieDecoder;

#[async_trait]
impl Middleware for CookieDecoder {
    async fn handle(&self, request: &mut Request, _response: &mut Response) -> Result<Flow, MiddlewareError> {
        let cookies = request.headers().get_all(COOKIE).flat_map(decode_cookie_header).collect();
        request.set_cookies(cookies);
        Ok(Flow::Continue)
    }
}
