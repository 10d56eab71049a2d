//! Test double for [`HealthReporter`] that records lifecycle events for
//! assertions.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use robolink_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The listener is accepting connections; carries the bound TCP address.
    ListenerStarted(Option<SocketAddr>),
    /// The listener stopped.
    ListenerStopped,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Waits up to two seconds for the listener to report its address.
    pub fn wait_for_listener(&self) -> Option<SocketAddr> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            let started = self.events().into_iter().find_map(|event| match event {
                HealthEvent::ListenerStarted(addr) => addr,
                _ => None,
            });
            if started.is_some() {
                return started;
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_started(&self, _endpoint: &SocketEndpoint, local_addr: Option<SocketAddr>) {
        self.record(HealthEvent::ListenerStarted(local_addr));
    }

    fn listener_stopped(&self, _endpoint: &SocketEndpoint) {
        self.record(HealthEvent::ListenerStopped);
    }
}
