//! Per-connection session actor.
//!
//! A session owns one transport, one framer and a dispatcher clone. It moves
//! through three states:
//!
//! - `Initializing`: transport bound, nothing read yet.
//! - `Active`: every tick performs one non-blocking read, frames whatever
//!   arrived and answers each request in arrival order.
//! - `Terminated`: the transport is released; no further reads or writes.
//!
//! Request-level failures become error envelopes and never end the session.
//! Only end-of-stream, transport failures and the buffer cap do.

mod handler;
#[cfg(test)]
mod test_support;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use robolink_config::Config;
use tracing::{Span, debug, info, info_span, warn};

use crate::dispatch::{CommandError, Envelope, RequestDispatcher};
use crate::framer::MessageFramer;
use crate::transport::{ReadOutcome, Transport};

pub use self::handler::SessionConnectionHandler;

const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Active,
    Terminated,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The peer closed the connection.
    EndOfStream,
    /// Reading from the transport failed.
    ReadFailed,
    /// Writing an envelope failed.
    WriteFailed,
    /// Pending bytes exceeded the buffer cap.
    BufferLimit,
    /// The owner terminated the session explicitly.
    Requested,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EndOfStream => "end_of_stream",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
            Self::BufferLimit => "buffer_limit",
            Self::Requested => "requested",
        })
    }
}

/// Tunables applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Sleep between ticks.
    pub poll_interval: Duration,
    /// Cap on unconsumed bytes; `None` disables the cap.
    pub max_buffer_bytes: Option<usize>,
}

impl SessionSettings {
    /// Reads the session tunables from daemon configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_buffer_bytes: config.max_buffer_bytes(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One client connection's request loop.
pub struct ConnectionSession<T: Transport> {
    id: u64,
    state: SessionState,
    transport: T,
    framer: MessageFramer,
    dispatcher: RequestDispatcher,
    settings: SessionSettings,
    reason: Option<TerminationReason>,
    span: Span,
}

impl<T: Transport> ConnectionSession<T> {
    /// Binds a transport; the session starts in `Initializing`.
    pub fn new(transport: T, dispatcher: RequestDispatcher, settings: SessionSettings) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            state: SessionState::Initializing,
            transport,
            framer: MessageFramer::new(),
            dispatcher,
            settings,
            reason: None,
            span: info_span!(target: SESSION_TARGET, "session", session = id),
        }
    }

    /// Process-unique session identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Why the session terminated, once it has.
    #[must_use]
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        self.reason
    }

    /// Bytes received but not yet framed.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.framer.pending_len()
    }

    /// Moves from `Initializing` to `Active`. Has no effect in other states.
    pub fn start(&mut self) {
        if self.state == SessionState::Initializing {
            self.state = SessionState::Active;
            info!(target: SESSION_TARGET, parent: &self.span, "session opened");
        }
    }

    /// Performs one poll step and returns the resulting state.
    pub fn tick(&mut self) -> SessionState {
        if self.state != SessionState::Active {
            return self.state;
        }
        let span = self.span.clone();
        let _entered = span.enter();

        match self.transport.try_read() {
            Ok(ReadOutcome::Data(bytes)) => self.receive(&bytes),
            Ok(ReadOutcome::Pending) => {}
            Ok(ReadOutcome::Closed) => self.terminate_with(TerminationReason::EndOfStream),
            Err(error) => {
                warn!(target: SESSION_TARGET, %error, "transport read failed");
                self.terminate_with(TerminationReason::ReadFailed);
            }
        }
        self.state
    }

    /// Starts the session and ticks until it terminates, sleeping for the
    /// poll interval between ticks.
    pub fn run(mut self) -> TerminationReason {
        self.start();
        while self.tick() == SessionState::Active {
            thread::sleep(self.settings.poll_interval);
        }
        self.reason.unwrap_or(TerminationReason::Requested)
    }

    /// Ends the session and releases the transport. Repeated calls do
    /// nothing.
    pub fn terminate(&mut self) {
        self.terminate_with(TerminationReason::Requested);
    }

    fn terminate_with(&mut self, reason: TerminationReason) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.state = SessionState::Terminated;
        self.reason = Some(reason);
        self.transport.close();
        info!(
            target: SESSION_TARGET,
            parent: &self.span,
            reason = %reason,
            unconsumed_bytes = self.framer.pending_len(),
            "session closed"
        );
    }

    fn receive(&mut self, bytes: &[u8]) {
        self.framer.push(bytes);
        while let Some(frame) = self.framer.next_frame() {
            let envelope = self.dispatcher.process_frame(&frame);
            if !self.send(&envelope) {
                return;
            }
        }
        self.enforce_buffer_cap();
    }

    fn enforce_buffer_cap(&mut self) {
        let Some(max_size) = self.settings.max_buffer_bytes else {
            return;
        };
        let size = self.framer.pending_len();
        if size <= max_size {
            return;
        }
        let error = CommandError::request_too_large(size, max_size);
        warn!(target: SESSION_TARGET, size, max_size, "pending request exceeds buffer cap");
        if self.send(&Envelope::from(error)) {
            self.terminate_with(TerminationReason::BufferLimit);
        }
    }

    /// Writes one envelope; terminates the session and returns `false` when
    /// the write fails.
    fn send(&mut self, envelope: &Envelope) -> bool {
        match self.transport.write_text(&envelope.encode()) {
            Ok(()) => {
                debug!(
                    target: SESSION_TARGET,
                    is_error = envelope.is_error(),
                    "envelope written"
                );
                true
            }
            Err(error) => {
                warn!(target: SESSION_TARGET, %error, "transport write failed");
                self.terminate_with(TerminationReason::WriteFailed);
                false
            }
        }
    }
}

impl<T: Transport> fmt::Debug for ConnectionSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("pending_bytes", &self.framer.pending_len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
