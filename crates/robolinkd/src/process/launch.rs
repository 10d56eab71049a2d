//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{
    ConfigLoader, InventoryMasterProvider, MasterProvider, SystemConfigLoader, bootstrap_with,
};
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SHUTDOWN_TIMEOUT};

/// Collaborators required to launch the daemon runtime.
pub struct LaunchPlan<L, P, S> {
    /// Source of the daemon configuration.
    pub loader: L,
    /// Supplies the master shared by all sessions.
    pub provider: P,
    /// Blocks until the daemon should stop.
    pub shutdown: S,
    /// Receives lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap, the listener or signal
/// handling fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        provider: InventoryMasterProvider,
        shutdown: SystemShutdownSignal::new(SHUTDOWN_TIMEOUT),
        reporter: Arc::new(StructuredHealthReporter::new()),
    })
}

/// Runs the daemon with injected collaborators.
///
/// Blocks until `plan.shutdown` fires, then stops accepting connections.
/// Sessions already running finish on their own threads when their peers
/// disconnect.
///
/// # Errors
///
/// Returns a [`LaunchError`] naming the stage that failed.
pub fn run_daemon_with<L, P, S>(plan: LaunchPlan<L, P, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    P: MasterProvider,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        provider,
        shutdown,
        reporter,
    } = plan;

    let daemon = bootstrap_with(&loader, reporter, &provider)?;
    info!(
        target: PROCESS_TARGET,
        socket = %daemon.config().daemon_socket(),
        protocol = %daemon.config().protocol(),
        "starting daemon runtime"
    );
    let handle = daemon.serve()?;
    let waited = shutdown.wait();
    daemon.stop(handle)?;
    waited?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
