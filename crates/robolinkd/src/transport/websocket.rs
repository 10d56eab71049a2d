//! WebSocket transport over an accepted stream.
//!
//! Text and binary frames both feed the session's framer; each envelope goes
//! out as one text frame. Control frames are answered by `tungstenite` while
//! reading.

use std::io;
use std::time::Duration;

use tracing::debug;
use tungstenite::{Message, WebSocket};

use super::channel::{ReadOutcome, Transport};
use super::errors::TransportError;
use super::stream::ConnectionStream;
use super::TRANSPORT_TARGET;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport speaking the WebSocket protocol.
#[derive(Debug)]
pub struct WebSocketTransport {
    socket: WebSocket<ConnectionStream>,
    closed: bool,
}

impl WebSocketTransport {
    /// Completes the server side of the HTTP upgrade, then switches the
    /// stream to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Handshake`] when the client does not send a
    /// valid upgrade request in time, or [`TransportError::Io`] when the
    /// stream mode cannot be changed.
    pub fn accept(stream: ConnectionStream) -> Result<Self, TransportError> {
        stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
        let socket = tungstenite::accept(stream).map_err(|error| TransportError::Handshake {
            message: error.to_string(),
        })?;
        socket.get_ref().set_read_timeout(None)?;
        socket.get_ref().set_nonblocking(true)?;
        Ok(Self {
            socket,
            closed: false,
        })
    }

    fn flush_pending(&mut self) -> Result<(), TransportError> {
        match self.socket.flush() {
            Err(tungstenite::Error::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {
                Ok(())
            }
            other => other.map_err(TransportError::from),
        }
    }
}

impl Transport for WebSocketTransport {
    fn try_read(&mut self) -> Result<ReadOutcome, TransportError> {
        if self.closed {
            return Ok(ReadOutcome::Closed);
        }
        match self.socket.read() {
            Ok(Message::Text(text)) => Ok(ReadOutcome::Data(text.as_bytes().to_vec())),
            Ok(Message::Binary(bytes)) => Ok(ReadOutcome::Data(bytes.to_vec())),
            Ok(Message::Close(_)) => Ok(ReadOutcome::Closed),
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                self.flush_pending()?;
                Ok(ReadOutcome::Pending)
            }
            Err(tungstenite::Error::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {
                self.flush_pending()?;
                Ok(ReadOutcome::Pending)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(ReadOutcome::Closed)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), TransportError> {
        match self.socket.send(Message::text(text.to_owned())) {
            Ok(()) => Ok(()),
            // Frame is queued; the next flush delivers it.
            Err(tungstenite::Error::Io(error)) if error.kind() == io::ErrorKind::WouldBlock => {
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(error) = self.socket.close(None) {
            debug!(target: TRANSPORT_TARGET, %error, "websocket close frame not sent");
        }
        if let Err(error) = self.flush_pending() {
            debug!(target: TRANSPORT_TARGET, %error, "websocket close not flushed");
        }
    }
}
