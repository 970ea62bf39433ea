//! Conversion between raw body bytes and typed [`Payload`] values.
//!
//! Codecs are looked up by the essence of the `Content-Type` value, so
//! `application/json; charset=utf-8` uses the `application/json` codec. Bodies with an unknown
//! or missing content type pass through as [`Payload::Raw`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use mime::Mime;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CodecError;

/// A decoded message body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Raw(Bytes),
    Text(String),
    /// Form fields in body order; repeated names are kept
    Form(Vec<(String, String)>),
    Json(Value),
}

impl Payload {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Raw(_) => "raw",
            Payload::Text(_) => "text",
            Payload::Form(_) => "form",
            Payload::Json(_) => "json",
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// First value of the form field `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        match self {
            Payload::Form(fields) => fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Deserializes a form or json payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns the serde error of the matching format, or [`CodecError::Unsupported`] for other
    /// payload kinds.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        match self {
            Payload::Json(value) => Ok(T::deserialize(value)?),
            Payload::Form(fields) => {
                let encoded = serde_urlencoded::to_string(fields)?;
                Ok(serde_urlencoded::from_str(&encoded)?)
            }
            other => Err(CodecError::Unsupported { payload: other.kind() }),
        }
    }
}

/// Converts one content type between bytes and [`Payload`].
pub trait BodyCodec: Send + Sync + fmt::Debug {
    /// # Errors
    ///
    /// Returns a [`CodecError`] when `body` is not valid for this content type.
    fn decode(&self, body: Bytes) -> Result<Payload, CodecError>;

    /// # Errors
    ///
    /// Returns a [`CodecError`] when `payload` can't be represented in this content type.
    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError>;
}

/// `text/plain`: the body as a UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl BodyCodec for TextCodec {
    fn decode(&self, body: Bytes) -> Result<Payload, CodecError> {
        Ok(Payload::Text(String::from_utf8(body.to_vec())?))
    }

    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
        match payload {
            Payload::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            other => passthrough(other).ok_or_else(|| CodecError::mismatch(mime::TEXT_PLAIN, other.kind())),
        }
    }
}

/// `application/x-www-form-urlencoded`: ordered name/value pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl BodyCodec for FormCodec {
    fn decode(&self, body: Bytes) -> Result<Payload, CodecError> {
        Ok(Payload::Form(serde_urlencoded::from_bytes(&body)?))
    }

    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
        match payload {
            Payload::Form(fields) => Ok(Bytes::from(serde_urlencoded::to_string(fields)?)),
            other => passthrough(other)
                .ok_or_else(|| CodecError::mismatch(mime::APPLICATION_WWW_FORM_URLENCODED, other.kind())),
        }
    }
}

/// `application/json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl BodyCodec for JsonCodec {
    fn decode(&self, body: Bytes) -> Result<Payload, CodecError> {
        Ok(Payload::Json(serde_json::from_slice(&body)?))
    }

    fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
        match payload {
            Payload::Json(value) => Ok(Bytes::from(serde_json::to_vec(value)?)),
            other => passthrough(other).ok_or_else(|| CodecError::mismatch(mime::APPLICATION_JSON, other.kind())),
        }
    }
}

/// Empty and raw payloads are written as-is whatever the content type.
fn passthrough(payload: &Payload) -> Option<Bytes> {
    match payload {
        Payload::Empty => Some(Bytes::new()),
        Payload::Raw(bytes) => Some(bytes.clone()),
        _ => None,
    }
}

/// Codecs keyed by mime essence.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn BodyCodec>>,
}

impl CodecRegistry {
    /// An empty registry; every body passes through as raw bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the text, form and json codecs installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(mime::TEXT_PLAIN.essence_str(), TextCodec);
        registry.register(mime::APPLICATION_WWW_FORM_URLENCODED.essence_str(), FormCodec);
        registry.register(mime::APPLICATION_JSON.essence_str(), JsonCodec);
        registry
    }

    /// Installs `codec` for `content_type`, replacing any codec registered before.
    pub fn register<C: BodyCodec + 'static>(&mut self, content_type: &str, codec: C) -> &mut Self {
        self.codecs.insert(essence(content_type), Arc::new(codec));
        self
    }

    pub fn find(&self, content_type: &str) -> Option<&dyn BodyCodec> {
        self.codecs.get(&essence(content_type)).map(Arc::as_ref)
    }

    /// Decodes `body` according to `content_type`.
    ///
    /// An empty body is always [`Payload::Empty`]; a body without a matching codec is
    /// [`Payload::Raw`].
    ///
    /// # Errors
    ///
    /// Propagates the error of the selected codec.
    pub fn decode(&self, content_type: Option<&str>, body: Bytes) -> Result<Payload, CodecError> {
        if body.is_empty() {
            return Ok(Payload::Empty);
        }

        match content_type.and_then(|content_type| self.find(content_type)) {
            Some(codec) => codec.decode(body),
            None => Ok(Payload::Raw(body)),
        }
    }

    /// Encodes `payload` according to `content_type`.
    ///
    /// Without a matching codec, empty, raw and text payloads are written as-is.
    ///
    /// # Errors
    ///
    /// Propagates the error of the selected codec, or returns [`CodecError::Unsupported`] for a
    /// form or json payload that has no codec.
    pub fn encode(&self, content_type: Option<&str>, payload: &Payload) -> Result<Bytes, CodecError> {
        if let Some(codec) = content_type.and_then(|content_type| self.find(content_type)) {
            return codec.encode(payload);
        }

        match payload {
            Payload::Text(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
            other => passthrough(other).ok_or(CodecError::Unsupported { payload: other.kind() }),
        }
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut content_types: Vec<_> = self.codecs.keys().collect();
        content_types.sort();
        f.debug_struct("CodecRegistry").field("content_types", &content_types).finish()
    }
}

/// Lowercased `type/subtype` without parameters; unparsable values are only trimmed and lowercased.
fn essence(content_type: &str) -> String {
    match content_type.parse::<Mime>() {
        Ok(mime) => mime.essence_str().to_ascii_lowercase(),
        Err(_e) => content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase(),
    }
}
