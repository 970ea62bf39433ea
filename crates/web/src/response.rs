//! The response side of the (request, response) pair.
//!
//! A fresh [`Response`] is `HTTP/1.1 200 OK` with no headers and an empty payload. Middleware
//! steps set the status, headers and payload; [`Response::into_message`] encodes the payload
//! through the [`CodecRegistry`] and fills in `Content-Type` and `Content-Length`.

use bytes::Bytes;
use http::StatusCode;
use relay_http::protocol::header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use relay_http::protocol::{HeaderList, MessageHead, OutgoingMessage, StatusLine};
use serde_json::Value;

use crate::codec::{CodecRegistry, Payload};
use crate::error::CodecError;

#[derive(Debug, Clone)]
pub struct Response {
    status_line: StatusLine,
    headers: HeaderList,
    content_type: Option<String>,
    payload: Payload,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status_line: StatusLine::http11(StatusCode::OK),
            headers: HeaderList::new(),
            content_type: None,
            payload: Payload::Empty,
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status_line.status()
    }

    /// Sets the status code along with its canonical reason phrase.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status_line = StatusLine::http11(status);
    }

    #[inline]
    pub fn status_line(&self) -> &StatusLine {
        &self.status_line
    }

    pub fn set_status_line(&mut self, status_line: StatusLine) {
        self.status_line = status_line;
    }

    #[inline]
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderList {
        &mut self.headers
    }

    /// Appends a `Set-Cookie` header.
    pub fn add_cookie(&mut self, cookie: impl Into<String>) {
        self.headers.push(SET_COOKIE, cookie);
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    /// A `text/plain` body.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_content_type(mime::TEXT_PLAIN_UTF_8.as_ref());
        self.payload = Payload::Text(text.into());
    }

    /// An `application/json` body.
    pub fn set_json(&mut self, value: Value) {
        self.set_content_type(mime::APPLICATION_JSON.as_ref());
        self.payload = Payload::Json(value);
    }

    /// An `application/x-www-form-urlencoded` body.
    pub fn set_form(&mut self, fields: Vec<(String, String)>) {
        self.set_content_type(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref());
        self.payload = Payload::Form(fields);
    }

    /// A body written verbatim, with no content type of its own.
    pub fn set_bytes(&mut self, bytes: impl Into<Bytes>) {
        self.payload = Payload::Raw(bytes.into());
    }

    /// Encodes the payload and builds the wire message.
    ///
    /// `Content-Type` is set when known and `Content-Length` always reflects the encoded body;
    /// both replace any value a step wrote into the header list.
    ///
    /// # Errors
    ///
    /// Returns the [`CodecError`] raised while encoding the payload.
    pub fn into_message(self, codecs: &CodecRegistry) -> Result<OutgoingMessage, CodecError> {
        let body = codecs.encode(self.content_type.as_deref(), &self.payload)?;

        let mut headers = self.headers;
        if let Some(content_type) = self.content_type {
            headers.set(CONTENT_TYPE, content_type);
        }
        headers.set(CONTENT_LENGTH, body.len().to_string());

        Ok(OutgoingMessage::new(MessageHead::new(self.status_line, headers), body))
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_is_empty_ok() {
        let message = Response::new().into_message(&CodecRegistry::with_defaults()).unwrap();

        assert_eq!(message.head().status_line().unwrap().status(), StatusCode::OK);
        assert_eq!(message.head().headers().get(CONTENT_LENGTH), Some("0"));
        assert!(!message.head().headers().contains(CONTENT_TYPE));
        assert!(message.body().is_empty());
    }

    #[test]
    fn json_body_sets_type_and_length() {
        let mut response = Response::new();
        response.set_status(StatusCode::CREATED);
        response.add_cookie("__SESSION=4a3b2c1d");
        response.set_json(json!({"id": 7}));

        let message = response.into_message(&CodecRegistry::with_defaults()).unwrap();
        let headers = message.head().headers();

        assert_eq!(message.head().status_line().unwrap().reason(), "Created");
        assert_eq!(headers.get(SET_COOKIE), Some("__SESSION=4a3b2c1d"));
        assert_eq!(headers.get(CONTENT_TYPE), Some("application/json"));
        assert_eq!(headers.get(CONTENT_LENGTH), Some("8"));
        assert_eq!(&message.body()[..], br#"{"id":7}"#);
    }

    #[test]
    fn stale_length_is_replaced() {
        let mut response = Response::new();
        response.headers_mut().push(CONTENT_LENGTH, "999");
        response.set_text("hi");

        let message = response.into_message(&CodecRegistry::with_defaults()).unwrap();

        assert_eq!(message.head().headers().get_all(CONTENT_LENGTH).collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(message.head().headers().get(CONTENT_TYPE), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn encoding_failure_is_reported() {
        let mut response = Response::new();
        response.set_content_type("application/json");
        response.set_payload(Payload::Form(vec![]));

        assert!(matches!(response.into_message(&CodecRegistry::with_defaults()), Err(CodecError::Mismatch { .. })));
    }
}
