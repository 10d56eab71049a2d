use crate::logging::LogFormat;
use crate::protocol::WireProtocol;
use crate::socket::SocketEndpoint;

/// Default host the daemon listens on.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Default TCP port the daemon listens on.
pub const DEFAULT_TCP_PORT: u16 = 9780;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default poll tick in milliseconds, roughly one sixtieth of a second.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Default cap on bytes buffered per session while waiting for a complete
/// request. Zero disables the cap.
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 1024 * 1024;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default wire protocol spoken on accepted connections.
#[must_use]
pub fn default_protocol() -> WireProtocol {
    WireProtocol::WebSocket
}

/// Computes the default socket endpoint for the daemon.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}

/// Default poll tick in milliseconds.
#[must_use]
pub fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Default per-session buffer cap in bytes.
#[must_use]
pub fn default_max_buffer_bytes() -> usize {
    DEFAULT_MAX_BUFFER_BYTES
}
