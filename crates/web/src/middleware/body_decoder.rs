use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::codec::CodecRegistry;
use crate::error::MiddlewareError;
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Waits for the request body and decodes it into the request payload.
///
/// The codec is chosen by the content type set by
/// [`CommonHeaderDecoder`](super::CommonHeaderDecoder); without one the body is kept raw.
#[derive(Debug, Clone)]
pub struct BodyDecoder {
    codecs: Arc<CodecRegistry>,
}

impl BodyDecoder {
    pub fn new(codecs: Arc<CodecRegistry>) -> Self {
        Self { codecs }
    }
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::new(Arc::new(CodecRegistry::with_defaults()))
    }
}

#[async_trait]
impl Middleware for BodyDecoder {
    async fn handle(&self, request: &mut Request, _response: &mut Response) -> Result<Flow, MiddlewareError> {
        let body = request.body().wait().await?;
        trace!(bytes = body.len(), content_type = ?request.content_type(), "decoding request body");

        let payload = self.codecs.decode(request.content_type(), body)?;
        request.set_payload(payload);
        Ok(Flow::Continue)
    }
}
