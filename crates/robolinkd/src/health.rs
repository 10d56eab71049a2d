//! Lifecycle milestones of the robot-control daemon.
//!
//! Bootstrap reports whether configuration, telemetry, the socket directory
//! and the robot inventory came up; [`crate::Daemon::serve`] and
//! [`crate::Daemon::stop`] report when the listening socket opens and closes.
//! Operators follow these records under the `robolinkd::health` target.

use std::net::SocketAddr;
use std::sync::Arc;

use robolink_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Receives the daemon's lifecycle milestones.
///
/// Tests substitute a recording implementation to assert on the order of
/// milestones without parsing log output.
pub trait HealthReporter: Send + Sync {
    /// The daemon is about to resolve its layered configuration.
    fn bootstrap_starting(&self);

    /// The master and dispatcher are built; sessions can be served with
    /// `config`.
    fn bootstrap_succeeded(&self, config: &Config);

    /// A bootstrap stage failed; `error` names which one.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// The socket is bound and robot clients can connect. TCP endpoints
    /// also pass the address actually bound, which differs from `endpoint`
    /// when port zero was requested.
    fn listener_started(&self, endpoint: &SocketEndpoint, local_addr: Option<SocketAddr>);

    /// The accept loop has exited; established sessions run until their
    /// peers disconnect.
    fn listener_stopped(&self, endpoint: &SocketEndpoint);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_started(&self, endpoint: &SocketEndpoint, local_addr: Option<SocketAddr>) {
        (**self).listener_started(endpoint, local_addr);
    }

    fn listener_stopped(&self, endpoint: &SocketEndpoint) {
        (**self).listener_stopped(endpoint);
    }
}

/// Emits each milestone as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Creates the reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "resolving robolinkd configuration"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.daemon_socket(),
            protocol = %config.protocol(),
            poll_interval_ms = config.poll_interval().as_millis(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            inventory = ?config.inventory_path(),
            max_buffer_bytes = ?config.max_buffer_bytes(),
            "robot master ready"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "robolinkd could not start"
        );
    }

    fn listener_started(&self, endpoint: &SocketEndpoint, local_addr: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_started",
            endpoint = %endpoint,
            local_addr = ?local_addr,
            "accepting robot client sessions"
        );
    }

    fn listener_stopped(&self, endpoint: &SocketEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            endpoint = %endpoint,
            "no longer accepting robot client sessions"
        );
    }
}
