//! Listener hook that runs one session per accepted connection.

use robolink_config::WireProtocol;
use tracing::{info, warn};

use super::{ConnectionSession, SESSION_TARGET, SessionSettings};
use crate::dispatch::RequestDispatcher;
use crate::transport::{
    ConnectionHandler, ConnectionStream, RawTransport, Transport, WebSocketTransport,
};

/// Wraps each accepted stream in the configured transport and runs a
/// [`ConnectionSession`] on the listener's connection thread.
#[derive(Debug, Clone)]
pub struct SessionConnectionHandler {
    dispatcher: RequestDispatcher,
    protocol: WireProtocol,
    settings: SessionSettings,
}

impl SessionConnectionHandler {
    /// Creates a handler sharing `dispatcher` across sessions.
    pub fn new(
        dispatcher: RequestDispatcher,
        protocol: WireProtocol,
        settings: SessionSettings,
    ) -> Self {
        Self {
            dispatcher,
            protocol,
            settings,
        }
    }

    fn serve<T: Transport>(&self, transport: T, peer: &str) {
        let session = ConnectionSession::new(transport, self.dispatcher.clone(), self.settings);
        let id = session.id();
        let reason = session.run();
        info!(target: SESSION_TARGET, session = id, peer, %reason, "connection finished");
    }
}

impl ConnectionHandler for SessionConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        let served = match self.protocol {
            WireProtocol::WebSocket => {
                WebSocketTransport::accept(stream).map(|ws| self.serve(ws, &peer))
            }
            WireProtocol::Raw => RawTransport::new(stream).map(|raw| self.serve(raw, &peer)),
        };
        if let Err(error) = served {
            warn!(
                target: SESSION_TARGET,
                peer = %peer,
                protocol = %self.protocol,
                %error,
                "failed to establish transport"
            );
        }
    }
}
