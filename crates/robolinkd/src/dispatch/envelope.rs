//! Response and error envelopes written back to clients.
//!
//! Each request yields exactly one envelope. Successful requests produce
//! `{"result": ..., "requestid": ...}` and failures produce
//! `{"error": <token>, "message": <text>}`. Envelopes carry no trailing
//! delimiter; a raw-stream client frames them the same way the daemon frames
//! requests.

use serde::Serialize;
use serde_json::Value;

use super::errors::CommandError;

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Successful result echoing the request identifier.
    Response {
        /// Handler result.
        result: Value,
        /// Identifier as sent by the client.
        #[serde(rename = "requestid")]
        request_id: String,
    },
    /// Failure for a single request.
    Error {
        /// Stable error token.
        error: &'static str,
        /// Human-readable detail.
        message: String,
    },
}

impl Envelope {
    /// Wraps a handler result.
    pub fn response(result: Value, request_id: impl Into<String>) -> Self {
        Self::Response {
            result,
            request_id: request_id.into(),
        }
    }

    /// Wraps a command error.
    #[must_use]
    pub fn error(error: &CommandError) -> Self {
        Self::Error {
            error: error.code(),
            message: error.to_string(),
        }
    }

    /// Whether this envelope reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serializes the envelope to its wire text.
    ///
    /// A result that cannot be serialized is replaced by an
    /// `internal_error` envelope, so encoding itself never fails.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|error| {
            let fallback = Self::error(&CommandError::internal(error.to_string()));
            serde_json::to_string(&fallback).unwrap_or_else(|_| {
                String::from(r#"{"error":"internal_error","message":"encoding failed"}"#)
            })
        })
    }
}

impl From<CommandError> for Envelope {
    fn from(error: CommandError) -> Self {
        Self::error(&error)
    }
}
