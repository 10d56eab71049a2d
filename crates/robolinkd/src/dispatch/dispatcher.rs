//! Turns framed requests into envelopes.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::Envelope;
use super::errors::CommandError;
use super::registry::HandlerRegistry;
use super::request::{Request, decode_frame};
use crate::master::Master;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes requests through the handler registry to the master.
///
/// Cloning is cheap; every session holds its own clone over the shared
/// registry and master.
#[derive(Clone)]
pub struct RequestDispatcher {
    registry: Arc<HandlerRegistry>,
    master: Arc<dyn Master>,
}

impl RequestDispatcher {
    /// Creates a dispatcher over a registry and master.
    pub fn new(registry: Arc<HandlerRegistry>, master: Arc<dyn Master>) -> Self {
        Self { registry, master }
    }

    /// The handler table in use.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Dispatches one decoded request.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidMessage`] for a malformed envelope,
    /// [`CommandError::UnhandledRequest`] for an unknown identifier, or
    /// whatever the handler reports.
    pub fn dispatch(&self, request: &Request) -> Result<Value, CommandError> {
        let handler = self
            .registry
            .get(request.canonical_id())
            .ok_or_else(|| CommandError::unhandled_request(request.request_id()))?;
        handler(self.master.as_ref(), request.params())
    }

    /// Decodes, dispatches and encodes one framed request.
    ///
    /// Every failure becomes an error envelope; this never fails.
    #[must_use]
    pub fn process_frame(&self, frame: &[u8]) -> Envelope {
        let request = match decode_frame(frame).and_then(Request::from_value) {
            Ok(request) => request,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, code = error.code(), %error, "rejected request");
                return Envelope::from(error);
            }
        };

        debug!(
            target: DISPATCH_TARGET,
            request_id = request.canonical_id(),
            "dispatching request"
        );

        match self.dispatch(&request) {
            Ok(result) => Envelope::response(result, request.request_id()),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    request_id = request.canonical_id(),
                    code = error.code(),
                    %error,
                    "request failed"
                );
                Envelope::from(error)
            }
        }
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
