//! BDD test world: loader, reporter, daemon and live client state for the
//! bootstrap and session suites.

use std::cell::RefCell;
use std::sync::Arc;

use serde_json::Value;

use robolink_config::WireProtocol;

use crate::bootstrap::{
    BootstrapError, ConfigLoader, Daemon, InventoryMasterProvider, bootstrap_with,
};
use crate::transport::ListenerHandle;

use super::client::TestClient;
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
    listener: Option<ListenerHandle>,
    client: Option<TestClient>,
    pub responses: Vec<Value>,
    pub closed_by_daemon: bool,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemon: None,
            bootstrap_error: None,
            listener: None,
            client: None,
            responses: Vec::new(),
            closed_by_daemon: false,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.use_loader(FailingConfigLoader);
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.use_loader(TestConfigLoader::new());
    }

    /// Installs a loader whose inventory file is missing.
    pub fn use_missing_inventory(&mut self) {
        self.use_loader(TestConfigLoader::new().with_missing_inventory());
    }

    /// Installs a TCP loader serving the sample inventory over `protocol`.
    pub fn use_tcp_daemon(&mut self, protocol: WireProtocol) {
        self.use_loader(
            TestConfigLoader::new()
                .tcp()
                .with_protocol(protocol)
                .with_sample_inventory(),
        );
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        match bootstrap_with(
            &*self.loader,
            self.reporter.clone(),
            &InventoryMasterProvider,
        ) {
            Ok(daemon) => {
                self.daemon = Some(daemon);
            }
            Err(error) => {
                self.bootstrap_error = Some(error);
            }
        }
    }

    /// Bootstraps, starts the listener and connects one client.
    pub fn serve_and_connect(&mut self) {
        self.bootstrap();
        let daemon = self.daemon.as_ref().expect("daemon bootstrapped");
        self.listener = Some(daemon.serve().expect("start listener"));
        let addr = self
            .reporter
            .wait_for_listener()
            .expect("listener address reported");
        self.client = Some(TestClient::connect(addr, daemon.config().protocol()));
    }

    /// Sends raw request text over the connected client.
    pub fn send(&mut self, text: &str) {
        self.client_mut().send(text);
    }

    /// Waits until `count` responses have arrived in total.
    pub fn receive(&mut self, count: usize) {
        let missing = count.saturating_sub(self.responses.len());
        if missing > 0 {
            let received = self.client_mut().receive(missing);
            self.responses.extend(received);
        }
    }

    /// Ends the client's side of the conversation.
    pub fn finish(&mut self) {
        let (received, closed) = self.client_mut().finish();
        self.responses.extend(received);
        self.closed_by_daemon = closed;
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when the daemon handle is available.
    #[must_use]
    pub fn daemon_started(&self) -> bool {
        self.daemon.is_some()
    }

    fn client_mut(&mut self) -> &mut TestClient {
        self.client.as_mut().expect("client connected")
    }

    fn use_loader(&mut self, loader: impl ConfigLoader + 'static) {
        self.loader = Box::new(loader);
        self.daemon = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestWorld {
    fn drop(&mut self) {
        self.client = None;
        if let (Some(daemon), Some(handle)) = (self.daemon.as_ref(), self.listener.take()) {
            let _ = daemon.stop(handle);
        }
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
