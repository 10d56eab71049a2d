//! Error types for request decoding and dispatch failures.
//!
//! Every failure raised while handling one framed request is a
//! [`CommandError`]. The session turns each into an error envelope whose
//! `error` field is [`CommandError::code`], so the token set is part of the
//! wire contract: tokens are lowercase, underscore separated, and distinct per
//! kind.

use thiserror::Error;

use crate::master::MasterError;

/// Errors surfaced while decoding, routing or executing a request.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The framed text was not valid JSON.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// Parser detail.
        message: String,
        /// Underlying parser error, when available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The JSON value was not an object carrying a string `requestid`.
    #[error("invalid message: {message}")]
    InvalidMessage {
        /// What was wrong with the message shape.
        message: String,
    },

    /// No handler is registered for the request identifier.
    #[error("unhandled request '{request_id}'")]
    UnhandledRequest {
        /// The identifier the client sent.
        request_id: String,
    },

    /// A handler rejected the operation-specific fields.
    #[error("invalid parameters: {message}")]
    InvalidParameters {
        /// Which field was missing or malformed.
        message: String,
    },

    /// The master collaborator refused or failed the operation.
    #[error(transparent)]
    Master(#[from] MasterError),

    /// Pending bytes exceeded the session's buffer cap.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Bytes buffered when the cap was hit.
        size: usize,
        /// Configured cap.
        max_size: usize,
    },

    /// A result could not be encoded.
    #[error("internal error: {message}")]
    Internal {
        /// Failure detail.
        message: String,
    },
}

impl CommandError {
    /// Stable wire token identifying the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "invalid_json",
            Self::InvalidMessage { .. } => "invalid_message",
            Self::UnhandledRequest { .. } => "unhandled_request",
            Self::InvalidParameters { .. } => "invalid_parameters",
            Self::Master(error) => error.code(),
            Self::RequestTooLarge { .. } => "request_too_large",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Creates an invalid JSON error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an invalid JSON error with a custom message.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid message error.
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Creates an unhandled request error.
    pub fn unhandled_request(request_id: impl Into<String>) -> Self {
        Self::UnhandledRequest {
            request_id: request_id.into(),
        }
    }

    /// Creates an invalid parameters error.
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Creates a request too large error.
    #[must_use]
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
