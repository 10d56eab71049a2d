//! Socket listener and per-connection transports.
//!
//! The listener binds the configured endpoint and accepts connections on a
//! background thread. Each accepted stream is wrapped in a [`Transport`]
//! (WebSocket or raw bytes) that a session polls without blocking.

mod channel;
mod errors;
mod listener;
mod raw;
mod stream;
#[cfg(test)]
mod test_utils;
mod websocket;

pub use self::channel::{ReadOutcome, Transport};
pub use self::errors::{ListenerError, TransportError};
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::raw::RawTransport;
pub use self::stream::{ConnectionHandler, ConnectionStream};
pub use self::websocket::WebSocketTransport;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport::listener");
const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
