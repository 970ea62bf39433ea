use std::error::Error;
use std::string::FromUtf8Error;

use relay_http::protocol::ParseError;
use thiserror::Error;

/// Failure of a single middleware step; it halts the pipeline for the current request.
#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("request body error: {source}")]
    Body {
        #[from]
        source: ParseError,
    },

    #[error("body codec error: {source}")]
    Codec {
        #[from]
        source: CodecError,
    },

    #[error("{reason}")]
    Custom { reason: String },

    #[error(transparent)]
    Other { source: Box<dyn Error + Send + Sync> },
}

impl MiddlewareError {
    pub fn custom<S: ToString>(reason: S) -> Self {
        Self::Custom { reason: reason.to_string() }
    }

    pub fn other<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Other { source: e.into() }
    }
}

/// Returned by [`Pipeline::run`](crate::Pipeline::run) when a step fails.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("middleware step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: MiddlewareError,
    },
}

impl PipelineError {
    /// Position of the failed step in the pipeline.
    pub fn index(&self) -> usize {
        match self {
            Self::Step { index, .. } => *index,
        }
    }
}

/// Conversion failures between body bytes and a [`Payload`](crate::codec::Payload).
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("body is not valid utf-8: {source}")]
    InvalidText {
        #[from]
        source: FromUtf8Error,
    },

    #[error("invalid form body: {source}")]
    FormDecode {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("can't encode form body: {source}")]
    FormEncode {
        #[from]
        source: serde_urlencoded::ser::Error,
    },

    #[error("json error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("{payload} payload can't be encoded as {content_type}")]
    Mismatch { content_type: String, payload: &'static str },

    #[error("no codec registered to encode a {payload} payload")]
    Unsupported { payload: &'static str },
}

impl CodecError {
    pub fn mismatch<S: ToString>(content_type: S, payload: &'static str) -> Self {
        Self::Mismatch { content_type: content_type.to_string(), payload }
    }
}
