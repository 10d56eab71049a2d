//! Shared configuration for the robolink daemon.
//!
//! Configuration is layered with `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path` or `ROBOLINK_CONFIG_PATH`), then
//! `ROBOLINK_*` environment variables, then command-line flags. Later layers
//! win.

mod defaults;
mod logging;
mod protocol;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_BUFFER_BYTES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TCP_HOST,
    DEFAULT_TCP_PORT, default_log_filter, default_log_filter_string, default_log_format,
    default_max_buffer_bytes, default_poll_interval_ms, default_protocol, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use protocol::{WireProtocol, WireProtocolParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "ROBOLINK")]
pub struct Config {
    /// Socket the daemon listens on.
    #[ortho_config(default = default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// Framing layer spoken on accepted connections.
    #[ortho_config(default = default_protocol())]
    pub protocol: WireProtocol,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Session poll tick in milliseconds.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Per-session cap on buffered request bytes; zero disables the cap.
    #[ortho_config(default = DEFAULT_MAX_BUFFER_BYTES)]
    pub max_buffer_bytes: usize,
    /// JSON inventory describing the robots served by the reference master.
    pub inventory_path: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            protocol: default_protocol(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            poll_interval_ms: default_poll_interval_ms(),
            max_buffer_bytes: default_max_buffer_bytes(),
            inventory_path: None,
        }
    }
}

/// Result alias returned by configuration loading.
pub type ConfigResult = Result<Config, Arc<OrthoError>>;

impl Config {
    /// Loads configuration from the process arguments, environment and any
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns the layered loader's error when a layer cannot be read or the
    /// merged values do not form a valid configuration.
    pub fn load() -> ConfigResult {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from_iter<I, T>(args: I) -> ConfigResult
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Socket the daemon listens on.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Framing layer spoken on accepted connections.
    #[must_use]
    pub fn protocol(&self) -> WireProtocol {
        self.protocol
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Session poll tick.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-session buffer cap, or `None` when the cap is disabled.
    #[must_use]
    pub fn max_buffer_bytes(&self) -> Option<usize> {
        (self.max_buffer_bytes > 0).then_some(self.max_buffer_bytes)
    }

    /// Inventory file path, when configured.
    #[must_use]
    pub fn inventory_path(&self) -> Option<&camino::Utf8Path> {
        self.inventory_path.as_deref()
    }
}
