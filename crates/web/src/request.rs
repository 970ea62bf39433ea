//! The request side of the (request, response) pair passed through a
//! [`Pipeline`](crate::Pipeline).
//!
//! A [`Request`] starts with the parsed request line, headers and the still pending body.
//! Middleware steps fill in the derived fields: content length and type, query parameters,
//! cookies, the session and the decoded payload.

use http::Method;
use relay_http::protocol::body::DeferredBody;
use relay_http::protocol::{FirstLine, HeaderList, Message, RequestLine};

use crate::codec::Payload;
use crate::cookie::find_cookie;
use crate::error::MiddlewareError;
use crate::session::Session;

#[derive(Debug)]
pub struct Request {
    line: RequestLine,
    headers: HeaderList,
    body: DeferredBody,
    content_length: Option<u64>,
    content_type: Option<String>,
    query_params: Vec<(String, String)>,
    cookies: Vec<String>,
    session: Option<Session>,
    payload: Payload,
}

impl Request {
    pub fn new(line: RequestLine, headers: HeaderList, body: DeferredBody) -> Self {
        Self {
            line,
            headers,
            body,
            content_length: None,
            content_type: None,
            query_params: Vec::new(),
            cookies: Vec::new(),
            session: None,
            payload: Payload::Empty,
        }
    }

    #[inline]
    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    #[inline]
    pub fn method(&self) -> &Method {
        self.line.method()
    }

    /// The request target as received, query string included.
    #[inline]
    pub fn target(&self) -> &str {
        self.line.path()
    }

    /// The request target without its query string.
    pub fn path(&self) -> &str {
        let target = self.line.path();
        target.split_once('?').map_or(target, |(path, _)| path)
    }

    /// The raw query string, if the target carries a non-empty one.
    pub fn query_string(&self) -> Option<&str> {
        self.line.path().split_once('?').map(|(_, query)| query).filter(|query| !query.is_empty())
    }

    #[inline]
    pub fn protocol(&self) -> &str {
        self.line.protocol()
    }

    #[inline]
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    /// The raw body, resolved once every declared byte has arrived.
    #[inline]
    pub fn body(&self) -> &DeferredBody {
        &self.body
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn set_content_length(&mut self, content_length: Option<u64>) {
        self.content_length = content_length;
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: Option<String>) {
        self.content_type = content_type;
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// First value of the query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn set_query_params(&mut self, query_params: Vec<(String, String)>) {
        self.query_params = query_params;
    }

    /// Cookies as `name=value` strings, in header order.
    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        find_cookie(&self.cookies, name)
    }

    pub fn set_cookies(&mut self, cookies: Vec<String>) {
        self.cookies = cookies;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// The decoded body; [`Payload::Empty`] until a body decoder ran.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    pub fn take_payload(&mut self) -> Payload {
        std::mem::take(&mut self.payload)
    }
}

impl TryFrom<Message> for Request {
    type Error = MiddlewareError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        let (head, body) = message.into_parts();
        match head.into_parts() {
            (FirstLine::Request(line), headers) => Ok(Self::new(line, headers, body)),
            (FirstLine::Status(line), _) => Err(MiddlewareError::custom(format!("expected a request, got status line {line}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use relay_http::protocol::{MessageHead, StatusLine};

    use super::*;

    fn request(target: &str) -> Request {
        Request::new(RequestLine::new(Method::GET, target, "HTTP/1.1"), HeaderList::new(), DeferredBody::resolved(""))
    }

    #[test]
    fn path_and_query() {
        let with_query = request("/search?q=rust&page=2");
        assert_eq!(with_query.path(), "/search");
        assert_eq!(with_query.query_string(), Some("q=rust&page=2"));
        assert_eq!(with_query.target(), "/search?q=rust&page=2");

        let trailing_mark = request("/search?");
        assert_eq!(trailing_mark.path(), "/search");
        assert_eq!(trailing_mark.query_string(), None);

        assert_eq!(request("/plain").query_string(), None);
    }

    #[test]
    fn from_message_requires_a_request_line() {
        let status = Message::new(
            MessageHead::new(StatusLine::http11(http::StatusCode::OK), HeaderList::new()),
            DeferredBody::resolved(""),
        );
        assert!(matches!(Request::try_from(status), Err(MiddlewareError::Custom { .. })));

        let get = Message::new(
            MessageHead::new(RequestLine::new(Method::GET, "/", "HTTP/1.1"), HeaderList::new()),
            DeferredBody::resolved(""),
        );
        assert_eq!(Request::try_from(get).unwrap().method(), &Method::GET);
    }
}
