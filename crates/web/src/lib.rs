//! A sequential middleware pipeline served over [`relay_http`].
//!
//! Each request is turned into a [`Request`] and paired with a fresh `200 OK` [`Response`].
//! The [`Pipeline`] then runs its steps one after another over that pair until a step halts,
//! fails or the steps are exhausted, and the response is encoded through the [`CodecRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relay_web::middleware::{BodyDecoder, CommonHeaderDecoder, CookieDecoder, QueryStringDecoder, SessionMiddleware};
//! use relay_web::session::SessionStore;
//! use relay_web::{Flow, Pipeline, Server, middleware_fn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = Pipeline::builder()
//!         .add_last(CommonHeaderDecoder)
//!         .add_last(QueryStringDecoder)
//!         .add_last(CookieDecoder)
//!         .add_last(SessionMiddleware::new(Arc::new(SessionStore::new())))
//!         .add_last(BodyDecoder::default())
//!         .add_last(middleware_fn(|req, resp| {
//!             resp.set_text(format!("hello {}", req.query_param("name").unwrap_or("world")));
//!             Ok(Flow::Halt)
//!         }))
//!         .build();
//!
//!     let server = Server::builder().address("127.0.0.1:8080").pipeline(pipeline).build().unwrap();
//!     server.start().await;
//! }
//! ```

pub mod codec;
pub mod cookie;
pub mod error;
pub mod middleware;
mod pipeline;
mod request;
mod response;
mod server;
pub mod session;

pub use codec::CodecRegistry;
pub use codec::Payload;
pub use error::CodecError;
pub use error::MiddlewareError;
pub use error::PipelineError;
pub use middleware::Flow;
pub use middleware::Middleware;
pub use middleware::middleware_fn;
pub use pipeline::Pipeline;
pub use pipeline::PipelineBuilder;
pub use pipeline::PipelineOutcome;
pub use request::Request;
pub use response::Response;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
