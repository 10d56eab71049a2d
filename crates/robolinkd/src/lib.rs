//! Robot control daemon.
//!
//! `robolinkd` accepts client connections over WebSocket or raw TCP/Unix
//! sockets and answers JSON requests about robots, their devices, commands
//! and connections. Requests arrive as concatenated JSON objects with no
//! delimiter between them; the [`framer`] module splits them by brace depth.
//! Each request names its operation in a `requestid` field, which the
//! [`dispatch`] module resolves against a static registry and forwards to a
//! [`Master`]. Every request gets exactly one reply envelope, either
//! `{"result": ..., "requestid": ...}` or `{"error": ..., "message": ...}`.
//!
//! One [`ConnectionSession`] runs per accepted connection on its own thread.
//! It polls its transport roughly every 16 ms, answers requests in arrival
//! order and ends only when the peer disconnects, the transport fails or the
//! client exceeds the configured buffer cap. Malformed or unknown requests
//! produce error envelopes and leave the session running.
//!
//! Bootstrap loads configuration through `ortho_config`, installs the
//! `tracing` subscriber and builds the shared dispatcher; [`run_daemon`]
//! then serves until a termination signal arrives.

mod bootstrap;
pub mod dispatch;
pub mod framer;
mod health;
pub mod master;
mod process;
pub mod session;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, InventoryMasterProvider, MasterProvider,
    StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use master::{Inventory, InventoryError, InventoryMaster, Master, MasterError};
pub use process::{
    LaunchError, LaunchPlan, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
    run_daemon_with,
};
pub use session::{ConnectionSession, SessionSettings, SessionState, TerminationReason};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
