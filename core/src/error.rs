//! Error types for the FatSecret client core.
//!
//! # Design
//! Failures are split by who caused them. `ApiError` is the server saying no
//! (bad key, bad signature, anything else it reports in an error envelope).
//! `DecodeError` means the call went through but the payload was not what we
//! expected. `TransportError` never leaves the host's I/O layer except through
//! `FatSecretError::Transport`. Callers match on `FatSecretError` to tell the
//! three apart.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FatSecretError>;

/// Top-level error returned by every client operation.
#[derive(Debug, Error)]
pub enum FatSecretError {
    /// The transport could not deliver the request or read the response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error envelope.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The server returned a non-2xx status without an error envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A call parameter tried to overwrite a protocol parameter.
    #[error("parameter `{0}` is reserved for the OAuth protocol")]
    ReservedParameter(String),
}

/// An error reported by the API inside a `{"error": {...}}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Code 5: the consumer key does not exist or is invalid.
    #[error("invalid consumer key: {message}")]
    InvalidConsumerKey { message: String },

    /// Code 8: the signature does not match the one the server computed.
    #[error("invalid signature: {message}")]
    InvalidSignature { message: String },

    /// Any other code, or an envelope with no usable code.
    #[error("unknown API error (code {code:?}): {message}")]
    Unknown { code: Option<i64>, message: String },
}

impl ApiError {
    pub const INVALID_CONSUMER_KEY: i64 = 5;
    pub const INVALID_SIGNATURE: i64 = 8;

    /// Map a numeric error code to its error kind.
    pub fn from_code(code: Option<i64>, message: String) -> Self {
        match code {
            Some(Self::INVALID_CONSUMER_KEY) => ApiError::InvalidConsumerKey { message },
            Some(Self::INVALID_SIGNATURE) => ApiError::InvalidSignature { message },
            other => ApiError::Unknown { code: other, message },
        }
    }

    /// The numeric code the server sent, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::InvalidConsumerKey { .. } => Some(Self::INVALID_CONSUMER_KEY),
            ApiError::InvalidSignature { .. } => Some(Self::INVALID_SIGNATURE),
            ApiError::Unknown { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidConsumerKey { message }
            | ApiError::InvalidSignature { message }
            | ApiError::Unknown { message, .. } => message,
        }
    }
}

/// The response payload did not match the expected shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("`{field}` field is malformed: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A failure inside the transport collaborator.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),

    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: &'static str },
}
