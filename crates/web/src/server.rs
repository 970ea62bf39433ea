use std::error::Error;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use relay_http::codec::ParserConfig;
use relay_http::connection::{ConnectionConfig, HttpConnection};
use relay_http::handler::Handler;
use relay_http::protocol::{Message, OutgoingMessage};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::codec::CodecRegistry;
use crate::pipeline::Pipeline;
use crate::request::Request;
use crate::response::Response;

pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    pipeline: Option<Pipeline>,
    codecs: Arc<CodecRegistry>,
    connection: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            address: None,
            pipeline: None,
            codecs: Arc::new(CodecRegistry::with_defaults()),
            connection: ConnectionConfig::default(),
        }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Codecs used to encode response payloads; share the same registry with a
    /// [`BodyDecoder`](crate::middleware::BodyDecoder) to keep both directions symmetric.
    pub fn codecs(mut self, codecs: Arc<CodecRegistry>) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.connection = self.connection.with_idle_timeout(idle_timeout);
        self
    }

    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        let parser = self.connection.parser_config().with_max_header_bytes(max_header_bytes);
        self.connection = self.connection.with_parser_config(parser);
        self
    }

    pub fn max_headers(mut self, max_headers: usize) -> Self {
        let parser = self.connection.parser_config().with_max_headers(max_headers);
        self.connection = self.connection.with_parser_config(parser);
        self
    }

    pub fn max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        let parser = self.connection.parser_config().with_max_body_bytes(max_body_bytes);
        self.connection = self.connection.with_parser_config(parser);
        self
    }

    pub fn parser_config(mut self, parser: ParserConfig) -> Self {
        self.connection = self.connection.with_parser_config(parser);
        self
    }

    /// # Errors
    ///
    /// Returns [`ServerBuildError`] when the address or the pipeline is missing, or when the
    /// address could not be resolved.
    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::invalid_address)?;
        let pipeline = self.pipeline.ok_or(ServerBuildError::MissingPipeline)?;
        Ok(Server { address, pipeline, codecs: self.codecs, connection: self.connection })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("pipeline must be set")]
    MissingPipeline,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

impl ServerBuildError {
    fn invalid_address(source: io::Error) -> Self {
        Self::InvalidAddress { source }
    }
}

/// Accepts connections and answers each request by running the pipeline.
///
/// The pipeline starts from a fresh `200 OK` [`Response`]. A failing step discards whatever it
/// prepared and the client receives `500 Internal Server Error`.
pub struct Server {
    address: Vec<SocketAddr>,
    pipeline: Pipeline,
    codecs: Arc<CodecRegistry>,
    connection: ConnectionConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    pub async fn start(self) {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            warn!(cause = %e, "global tracing subscriber already set");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return;
            }
        };

        self.serve(tcp_listener).await;
    }

    /// Runs the accept loop on an already bound listener.
    pub async fn serve(self, tcp_listener: TcpListener) {
        let connection_config = self.connection;
        let handler = Arc::new(self);
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_config(reader, writer, connection_config);
                match connection.process(handler).await {
                    Ok(()) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                    }
                }
            });
        }
    }

    /// Runs the pipeline for one parsed message and encodes the resulting response.
    ///
    /// # Errors
    ///
    /// Returns the pipeline or codec error; the connection turns it into a `500` response.
    pub async fn respond(&self, message: Message) -> Result<OutgoingMessage, Box<dyn Error + Send + Sync>> {
        let mut request = Request::try_from(message)?;
        let mut response = Response::new();

        let outcome = self.pipeline.run(&mut request, &mut response).await?;
        debug!(outcome = ?outcome, status = %response.status(), "pipeline finished");

        Ok(response.into_message(&self.codecs)?)
    }
}

#[async_trait]
impl Handler for Server {
    type Error = Box<dyn Error + Send + Sync>;

    async fn call(&self, message: Message) -> Result<OutgoingMessage, Self::Error> {
        self.respond(message).await
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address)
            .field("pipeline", &self.pipeline)
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder").field("pipeline", &self.pipeline).field("codecs", &self.codecs).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use indoc::indoc;
    use relay_http::codec::MessageParser;
    use relay_http::protocol::body::DeferredBody;
    use relay_http::protocol::header::SET_COOKIE;
    use relay_http::protocol::{HeaderList, MessageHead, RequestLine};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex, split};

    use super::*;
    use crate::error::MiddlewareError;
    use crate::middleware::{
        BodyDecoder, CommonHeaderDecoder, CookieDecoder, Flow, QueryStringDecoder, SessionMiddleware, middleware_fn,
    };
    use crate::session::SessionStore;

    fn server(store: Arc<SessionStore>) -> Server {
        let codecs = Arc::new(CodecRegistry::with_defaults());
        let pipeline = Pipeline::builder()
            .add_last(CommonHeaderDecoder)
            .add_last(QueryStringDecoder)
            .add_last(CookieDecoder)
            .add_last(SessionMiddleware::new(store))
            .add_last(BodyDecoder::new(Arc::clone(&codecs)))
            .add_last(middleware_fn(|req, resp| {
                if req.path() == "/fail" {
                    return Err(MiddlewareError::custom("refused"));
                }
                let name = req.query_param("name").or_else(|| req.payload().form_value("name")).unwrap_or("stranger");
                resp.set_json(json!({ "hello": name, "path": req.path() }));
                Ok(Flow::Halt)
            }))
            .build();

        Server::builder().address("127.0.0.1:0").pipeline(pipeline).codecs(codecs).build().unwrap()
    }

    fn message(raw: &str) -> Message {
        MessageParser::request().add_data(raw.replace('\n', "\r\n").as_bytes()).unwrap().unwrap()
    }

    #[test]
    fn build_requires_address_and_pipeline() {
        assert!(matches!(Server::builder().pipeline(Pipeline::new()).build(), Err(ServerBuildError::MissingAddress)));
        assert!(matches!(Server::builder().address("127.0.0.1:0").build(), Err(ServerBuildError::MissingPipeline)));
    }

    #[tokio::test]
    async fn responds_through_the_pipeline() {
        let store = Arc::new(SessionStore::new());
        let server = server(Arc::clone(&store));

        let request = message(indoc! {"
            POST /greet HTTP/1.1
            Content-Type: application/x-www-form-urlencoded
            Content-Length: 8

            name=ada"});
        let response = server.respond(request).await.unwrap();
        let headers = response.head().headers();

        assert_eq!(response.head().status_line().unwrap().status(), StatusCode::OK);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert!(headers.get(SET_COOKIE).unwrap().starts_with("__SESSION="));
        assert_eq!(store.len(), 1);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"hello": "ada", "path": "/greet"}));
        assert_eq!(headers.get("Content-Length"), Some(response.body().len().to_string().as_str()));
    }

    #[tokio::test]
    async fn failing_step_is_an_error() {
        let server = server(Arc::new(SessionStore::new()));

        let result = server.respond(message("GET /fail HTTP/1.1\n\n")).await;

        assert_eq!(result.unwrap_err().to_string(), "middleware step 5 failed: refused");
    }

    #[tokio::test]
    async fn empty_pipeline_answers_ok() {
        let server = Server::builder().address("127.0.0.1:0").pipeline(Pipeline::new()).build().unwrap();
        let head = MessageHead::new(RequestLine::new(http::Method::GET, "/", "HTTP/1.1"), HeaderList::new());

        let response = server.call(Message::new(head, DeferredBody::resolved(""))).await.unwrap();

        assert_eq!(response, OutgoingMessage::status_only(StatusCode::OK));
    }

    #[tokio::test]
    async fn serves_a_connection_end_to_end() {
        let server = Arc::new(server(Arc::new(SessionStore::new())));
        let (mut client, stream) = duplex(4096);
        let (reader, writer) = split(stream);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(server));

        client.write_all(b"GET /hi?name=grace HTTP/1.1\r\nCookie: theme=dark\r\n\r\n").await.unwrap();
        let mut raw = Vec::new();
        client.read_to_end(&mut raw).await.unwrap();
        task.await.unwrap().unwrap();

        let mut parser = MessageParser::response();
        let response = parser.add_data(&raw).unwrap().unwrap();
        let body = response.body().try_get().unwrap().unwrap();

        assert_eq!(response.head().status_line().unwrap().status(), StatusCode::OK);
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap(), json!({"hello": "grace", "path": "/hi"}));
    }

    #[tokio::test]
    async fn failing_step_becomes_internal_server_error() {
        let server = Arc::new(server(Arc::new(SessionStore::new())));
        let (mut client, stream) = duplex(4096);
        let (reader, writer) = split(stream);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(server));

        client.write_all(b"GET /fail HTTP/1.1\r\n\r\n").await.unwrap();
        let mut raw = String::new();
        client.read_to_string(&mut raw).await.unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(raw, "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");
    }
}
