//! Counts visits per browser session and echoes decoded request bodies.
//!
//! ```sh
//! curl -i -c jar -b jar http://127.0.0.1:3000/visits
//! curl -i -H 'Content-Type: application/json' -d '{"a":1}' http://127.0.0.1:3000/echo
//! ```

use std::sync::Arc;

use http::StatusCode;
use relay_web::middleware::{BodyDecoder, CommonHeaderDecoder, CookieDecoder, QueryStringDecoder, SessionMiddleware};
use relay_web::session::SessionStore;
use relay_web::{CodecRegistry, Flow, MiddlewareError, Pipeline, Request, Response, Server, middleware_fn};
use serde_json::json;

fn count_visits(req: &mut Request, resp: &mut Response) -> Result<Flow, MiddlewareError> {
    if req.path() != "/visits" {
        return Ok(Flow::Continue);
    }

    let session = req.session().ok_or_else(|| MiddlewareError::custom("session middleware missing"))?;
    let visits = session.get("visits").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
    session.insert("visits", json!(visits));

    resp.set_json(json!({ "session": session.id().to_string(), "visits": visits }));
    Ok(Flow::Halt)
}

fn echo(req: &mut Request, resp: &mut Response) -> Result<Flow, MiddlewareError> {
    if req.path() != "/echo" {
        return Ok(Flow::Continue);
    }

    let content_type = req.content_type().map(str::to_string);
    resp.set_payload(req.take_payload());
    if let Some(content_type) = content_type {
        resp.set_content_type(content_type);
    }
    Ok(Flow::Halt)
}

fn not_found(_req: &mut Request, resp: &mut Response) -> Result<Flow, MiddlewareError> {
    resp.set_status(StatusCode::NOT_FOUND);
    resp.set_text("404 not found");
    Ok(Flow::Halt)
}

#[tokio::main]
async fn main() {
    let codecs = Arc::new(CodecRegistry::with_defaults());

    let pipeline = Pipeline::builder()
        .add_last(CommonHeaderDecoder)
        .add_last(QueryStringDecoder)
        .add_last(CookieDecoder)
        .add_last(SessionMiddleware::new(Arc::new(SessionStore::new())))
        .add_last(BodyDecoder::new(Arc::clone(&codecs)))
        .add_last(middleware_fn(count_visits))
        .add_last(middleware_fn(echo))
        .add_last(middleware_fn(not_found))
        .build();

    Server::builder()
        .address("127.0.0.1:3000")
        .pipeline(pipeline)
        .codecs(codecs)
        .build()
        .unwrap()
        .start()
        .await;
}
