use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use futures::SinkExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio::time::timeout;
use tokio_util::codec::FramedWrite;
use tracing::{debug, error, info, trace};

use crate::codec::{FirstLineKind, MessageEncoder, MessageParser, ParserConfig};
use crate::handler::Handler;
use crate::protocol::{HttpError, Message, OutgoingMessage, ParseError, SendError};

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Settings applied to every [`HttpConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    idle_timeout: Duration,
    read_buffer_size: usize,
    parser: ParserConfig,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self { idle_timeout: DEFAULT_IDLE_TIMEOUT, read_buffer_size: DEFAULT_READ_BUFFER_SIZE, parser: ParserConfig::new() }
    }

    /// Longest wait for a single read before the request is abandoned.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn with_parser_config(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    #[inline]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    #[inline]
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    #[inline]
    pub fn parser_config(&self) -> ParserConfig {
        self.parser
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An HTTP connection serving exactly one request.
///
/// The request head is read and parsed first. The handler then runs concurrently with the
/// reader that feeds the remaining body bytes to the parser, so a handler awaiting the body
/// makes progress. Once the response is written the stream is shut down.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: R,
    framed_write: FramedWrite<W, MessageEncoder>,
    parser: MessageParser,
    read_buffer: Vec<u8>,
    idle_timeout: Duration,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self {
            reader,
            framed_write: FramedWrite::new(writer, MessageEncoder::new()),
            parser: MessageParser::with_config(FirstLineKind::Request, config.parser),
            read_buffer: vec![0; config.read_buffer_size],
            idle_timeout: config.idle_timeout,
        }
    }

    /// Reads one request, answers it with `handler` and closes the stream.
    ///
    /// A stream closed before any byte arrived is a clean shutdown.
    ///
    /// # Errors
    ///
    /// Returns the parse, read or write error that ended the exchange. Malformed requests are
    /// answered with `400 Bad Request` before the error is returned.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let message = match self.read_head().await {
            Ok(Some(message)) => message,
            Ok(None) => {
                info!("connection closed before a request arrived");
                return Ok(());
            }
            Err(e) => return self.reject(e).await,
        };

        if let Some(line) = message.head().request_line() {
            debug!(method = %line.method(), path = line.path(), "receive request");
        }

        let (response_result, body_result) = {
            tokio::pin! {
                let request_handle_future = handler.call(message);
                let body_read_future = self.read_body();
            }

            let mut body_result = None;
            let response_result = loop {
                select! {
                    biased;
                    response = &mut request_handle_future => break response,
                    result = &mut body_read_future, if body_result.is_none() => body_result = Some(result),
                }
            };
            (response_result, body_result)
        };

        if let Some(Err(e)) = body_result {
            return self.reject(e).await;
        }

        let response = match response_result {
            Ok(response) => response,
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %e, "handle request error");
                OutgoingMessage::status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        self.send_response(response).await
    }

    async fn read_head(&mut self) -> Result<Option<Message>, HttpError> {
        loop {
            let read = self.read_chunk().await?;
            if read == 0 {
                if !self.parser.has_started() {
                    return Ok(None);
                }
                self.parser.end()?;
                return Ok(None);
            }

            if let Some(message) = self.parser.add_data(&self.read_buffer[..read])? {
                self.parser.check_overrun()?;
                return Ok(Some(message));
            }
        }
    }

    /// Feeds body bytes to the parser until the message is complete.
    async fn read_body(&mut self) -> Result<(), HttpError> {
        while !self.parser.is_complete() {
            let read = self.read_chunk().await?;
            if read == 0 {
                self.parser.end()?;
                break;
            }
            self.parser.add_data(&self.read_buffer[..read])?;
        }
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<usize, HttpError> {
        match timeout(self.idle_timeout, self.reader.read(&mut self.read_buffer)).await {
            Ok(Ok(read)) => {
                trace!(bytes = read, "read from connection");
                Ok(read)
            }
            Ok(Err(e)) => {
                self.parser.abort(ParseError::unexpected_eof(format!("read failed: {e}")));
                Err(e.into())
            }
            Err(_elapsed) => {
                let e = ParseError::read_timeout(self.idle_timeout);
                self.parser.abort(e.clone());
                Err(e.into())
            }
        }
    }

    async fn reject(&mut self, e: HttpError) -> Result<(), HttpError> {
        error!(cause = %e, "can't receive request");

        if let HttpError::RequestError { source } = &e
            && source.is_syntax()
        {
            self.send_response(OutgoingMessage::status_only(StatusCode::BAD_REQUEST)).await?;
        }
        Err(e)
    }

    async fn send_response(&mut self, response: OutgoingMessage) -> Result<(), HttpError> {
        self.framed_write.send(response).await?;
        self.framed_write.get_mut().shutdown().await.map_err(SendError::io)?;
        Ok(())
    }
}
