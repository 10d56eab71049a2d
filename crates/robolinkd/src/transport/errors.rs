//! Error types for the listener and per-connection transports.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix { endpoint: String },
    #[cfg(unix)]
    #[error("failed to bind unix listener at {path}: {source}")]
    BindUnix {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("existing unix socket {path} is already in use")]
    UnixInUse { path: String },
    #[cfg(unix)]
    #[error("unix socket path {path} is not a socket")]
    UnixNotSocket { path: String },
    #[cfg(unix)]
    #[error("failed to inspect unix socket {path}: {source}")]
    UnixMetadata {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("failed to probe existing unix socket {path}: {source}")]
    UnixConnect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("failed to remove stale unix socket {path}: {source}")]
    UnixCleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("listener thread panicked")]
    ThreadPanic,
}

/// Errors raised by a connection transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying socket failed.
    #[error("socket I/O failed: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    /// The WebSocket upgrade did not complete.
    #[error("websocket handshake failed: {message}")]
    Handshake { message: String },
    /// The WebSocket protocol layer failed.
    #[error("websocket error: {source}")]
    WebSocket {
        #[source]
        source: Box<tungstenite::Error>,
    },
    /// A write could not complete before the deadline.
    #[error("write stalled after {written} of {total} bytes")]
    WriteStalled { written: usize, total: usize },
}

impl From<io::Error> for TransportError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(source: tungstenite::Error) -> Self {
        match source {
            tungstenite::Error::Io(source) => Self::Io { source },
            other => Self::WebSocket {
                source: Box::new(other),
            },
        }
    }
}
