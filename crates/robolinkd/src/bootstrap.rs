//! Daemon bootstrap orchestration.
//!
//! Bootstrap loads configuration, installs telemetry, prepares the socket
//! filesystem and builds the master and dispatcher shared by every session.
//! Each stage reports failure through the [`HealthReporter`] before
//! returning.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use robolink_config::{Config, SocketPreparationError};

use crate::dispatch::{HandlerRegistry, RequestDispatcher};
use crate::health::HealthReporter;
use crate::master::{Inventory, InventoryError, InventoryMaster, Master};
use crate::session::{SessionConnectionHandler, SessionSettings};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already-resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Supplies the master the daemon's sessions share.
pub trait MasterProvider: Send + Sync {
    /// Builds the master for a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InventoryError`] when backing data cannot be loaded.
    fn provide(&self, config: &Config) -> Result<Arc<dyn Master>, InventoryError>;
}

/// Serves the inventory file named by `inventory_path`, or an empty
/// inventory when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryMasterProvider;

impl MasterProvider for InventoryMasterProvider {
    fn provide(&self, config: &Config) -> Result<Arc<dyn Master>, InventoryError> {
        let inventory = match config.inventory_path() {
            Some(path) => Inventory::load(path)?,
            None => Inventory::default(),
        };
        Ok(Arc::new(InventoryMaster::new(inventory)))
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The robot inventory could not be loaded.
    #[error("failed to load robot inventory: {source}")]
    Inventory {
        /// Underlying inventory error.
        #[source]
        source: InventoryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    dispatcher: RequestDispatcher,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// The dispatcher every session clones.
    #[must_use]
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Builds the per-connection handler for the configured protocol.
    #[must_use]
    pub fn connection_handler(&self) -> SessionConnectionHandler {
        SessionConnectionHandler::new(
            self.dispatcher.clone(),
            self.config.protocol(),
            SessionSettings::from_config(&self.config),
        )
    }

    /// Binds the configured socket and starts accepting sessions.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the socket cannot be bound or
    /// switched to non-blocking mode.
    pub fn serve(&self) -> Result<ListenerHandle, ListenerError> {
        let listener = SocketListener::bind(self.config.daemon_socket())?;
        let local_addr = listener.local_addr();
        let handle = listener.start(Arc::new(self.connection_handler()))?;
        self.reporter
            .listener_started(self.config.daemon_socket(), local_addr);
        Ok(handle)
    }

    /// Stops a listener started by [`Daemon::serve`] and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the accept loop panicked.
    pub fn stop(&self, handle: ListenerHandle) -> Result<(), ListenerError> {
        handle.shutdown();
        let joined = handle.join();
        self.reporter.listener_stopped(self.config.daemon_socket());
        joined
    }
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the stage that failed; the reporter
/// has already been told.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    provider: &dyn MasterProvider,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match build_daemon(loader, &reporter, provider) {
        Ok(daemon) => {
            reporter.bootstrap_succeeded(&daemon.config);
            Ok(daemon)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn build_daemon(
    loader: &dyn ConfigLoader,
    reporter: &Arc<dyn HealthReporter>,
    provider: &dyn MasterProvider,
) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .daemon_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;
    let master = provider
        .provide(&config)
        .map_err(|source| BootstrapError::Inventory { source })?;
    let dispatcher = RequestDispatcher::new(Arc::new(HandlerRegistry::standard()), master);

    Ok(Daemon {
        config,
        dispatcher,
        telemetry,
        reporter: Arc::clone(reporter),
    })
}
