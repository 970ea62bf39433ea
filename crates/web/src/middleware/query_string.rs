use async_trait::async_trait;

use crate::error::{CodecError, MiddlewareError};
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Decodes the query string of the request target into ordered name/value pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringDecoder;

#[async_trait]
impl Middleware for QueryStringDecoder {
    async fn handle(&self, request: &mut Request, _response: &mut Response) -> Result<Flow, MiddlewareError> {
        let Some(query) = request.query_string() else {
            return Ok(Flow::Continue);
        };

        let params: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(CodecError::from)?;
        request.set_query_params(params);
        Ok(Flow::Continue)
    }
}
