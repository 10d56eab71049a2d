//! Message channel abstraction a session reads requests from and writes
//! envelopes to.

use super::errors::TransportError;

/// Result of one non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes received since the previous read.
    Data(Vec<u8>),
    /// Nothing available yet.
    Pending,
    /// The peer closed the connection.
    Closed,
}

/// Bidirectional, non-blocking text channel owned by one session.
pub trait Transport {
    /// Polls for incoming bytes without blocking.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the connection has failed; the
    /// session treats this like end-of-stream.
    fn try_read(&mut self) -> Result<ReadOutcome, TransportError>;

    /// Sends one envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the text cannot be delivered.
    fn write_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Releases the connection. Must tolerate repeated calls.
    fn close(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn try_read(&mut self) -> Result<ReadOutcome, TransportError> {
        (**self).try_read()
    }

    fn write_text(&mut self, text: &str) -> Result<(), TransportError> {
        (**self).write_text(text)
    }

    fn close(&mut self) {
        (**self).close();
    }
}
