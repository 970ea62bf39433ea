use async_trait::async_trait;
use relay_http::protocol::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::error::MiddlewareError;
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Copies `Content-Length` and `Content-Type` from the headers onto the request.
///
/// Only headers with exactly these names are read. A length that is not a number is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonHeaderDecoder;

#[async_trait]
impl Middleware for CommonHeaderDecoder {
    async fn handle(&self, request: &mut Request, _response: &mut Response) -> Result<Flow, MiddlewareError> {
        let content_length = request.headers().get(CONTENT_LENGTH).and_then(|value| value.trim().parse().ok());
        let content_type = request.headers().get(CONTENT_TYPE).map(str::to_string);

        request.set_content_length(content_length);
        request.set_content_type(content_type);
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use relay_http::protocol::body::DeferredBody;

    use super::*;
    use crate::middleware::test_support::request_with;

    #[tokio::test]
    async fn decodes_length_and_type() {
        let headers = [("Content-Type", "application/json"), ("Content-Length", "2")];
        let mut request = request_with("/", &headers, DeferredBody::resolved("{}"));

        let flow = CommonHeaderDecoder.handle(&mut request, &mut Response::new()).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(request.content_length(), Some(2));
        assert_eq!(request.content_type(), Some("application/json"));
    }

    #[tokio::test]
    async fn absent_headers() {
        let mut request = request_with("/", &[("content-type", "text/plain")], DeferredBody::resolved(""));

        CommonHeaderDecoder.handle(&mut request, &mut Response::new()).await.unwrap();

        assert_eq!(request.content_length(), None);
        assert_eq!(request.content_type(), None);
    }
}
