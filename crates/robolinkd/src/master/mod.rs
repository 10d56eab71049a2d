//! The master collaborator that owns robot, device and command state.
//!
//! Request handlers never touch robot state directly; they call through the
//! [`Master`] trait. The daemon ships [`InventoryMaster`], which serves a
//! static inventory loaded from JSON, and tests substitute doubles.

mod inventory;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use self::inventory::{Inventory, InventoryError, InventoryMaster};

/// Summary of a robot known to the master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDescriptor {
    /// Stable robot identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form robot category.
    pub kind: String,
}

/// Summary of a device mounted on a robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device identifier, unique within its robot.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Free-form device category.
    pub kind: String,
}

/// A command a robot or device accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Command identifier.
    pub id: String,
    /// Number of positional arguments the command expects.
    pub arity: usize,
    /// Optional description shown to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A link between a robot and the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    /// Connection identifier, unique within its robot.
    pub id: String,
    /// Link type, for example `serial` or `tcp`.
    pub kind: String,
    /// Address of the link endpoint.
    pub address: String,
    /// Whether the link is currently up.
    #[serde(default)]
    pub connected: bool,
}

/// Failures reported by the master.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MasterError {
    /// No robot with the given identifier.
    #[error("unknown robot '{robot}'")]
    RobotNotFound {
        /// Requested robot identifier.
        robot: String,
    },
    /// The robot has no device with the given identifier.
    #[error("robot '{robot}' has no device '{device}'")]
    DeviceNotFound {
        /// Robot identifier.
        robot: String,
        /// Requested device identifier.
        device: String,
    },
    /// The target does not accept the given command.
    #[error("'{target}' has no command '{command}'")]
    CommandNotFound {
        /// Robot or `robot/device` path the command was sent to.
        target: String,
        /// Requested command identifier.
        command: String,
    },
    /// The robot has no connection with the given identifier.
    #[error("robot '{robot}' has no connection '{connection}'")]
    ConnectionNotFound {
        /// Robot identifier.
        robot: String,
        /// Requested connection identifier.
        connection: String,
    },
    /// The command was invoked with the wrong number of arguments.
    #[error("command '{command}' expects {expected} argument(s), got {actual}")]
    InvalidArgumentCount {
        /// Command identifier.
        command: String,
        /// Declared arity.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },
    /// The command was accepted but failed while running.
    #[error("command '{command}' failed: {message}")]
    CommandFailed {
        /// Command identifier.
        command: String,
        /// Failure detail.
        message: String,
    },
}

impl MasterError {
    /// Stable wire token for this failure.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RobotNotFound { .. } => "robot_not_found",
            Self::DeviceNotFound { .. } => "device_not_found",
            Self::CommandNotFound { .. } => "command_not_found",
            Self::ConnectionNotFound { .. } => "connection_not_found",
            Self::InvalidArgumentCount { .. } => "invalid_argument_count",
            Self::CommandFailed { .. } => "command_failed",
        }
    }

    /// Creates a robot-not-found error.
    pub fn robot_not_found(robot: impl Into<String>) -> Self {
        Self::RobotNotFound {
            robot: robot.into(),
        }
    }

    /// Creates a device-not-found error.
    pub fn device_not_found(robot: impl Into<String>, device: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            robot: robot.into(),
            device: device.into(),
        }
    }

    /// Creates a command-not-found error.
    pub fn command_not_found(target: impl Into<String>, command: impl Into<String>) -> Self {
        Self::CommandNotFound {
            target: target.into(),
            command: command.into(),
        }
    }

    /// Creates a connection-not-found error.
    pub fn connection_not_found(robot: impl Into<String>, connection: impl Into<String>) -> Self {
        Self::ConnectionNotFound {
            robot: robot.into(),
            connection: connection.into(),
        }
    }
}

/// Authority over robot state, shared read-only by every session.
///
/// Each call is treated as atomic by the dispatcher; implementations handle
/// their own synchronisation.
pub trait Master: Send + Sync {
    /// Lists every robot.
    fn list_robots(&self) -> Result<Vec<RobotDescriptor>, MasterError>;

    /// Looks up one robot.
    fn get_robot(&self, robot: &str) -> Result<RobotDescriptor, MasterError>;

    /// Lists the commands a robot accepts.
    fn get_robot_commands(&self, robot: &str) -> Result<Vec<CommandDescriptor>, MasterError>;

    /// Runs a robot command with positional arguments.
    fn execute_robot_command(
        &self,
        robot: &str,
        command: &str,
        args: &[Value],
    ) -> Result<Value, MasterError>;

    /// Lists the devices mounted on a robot.
    fn list_robot_devices(&self, robot: &str) -> Result<Vec<DeviceDescriptor>, MasterError>;

    /// Looks up one device on a robot.
    fn get_robot_device(&self, robot: &str, device: &str)
    -> Result<DeviceDescriptor, MasterError>;

    /// Lists the commands a device accepts.
    fn get_device_commands(
        &self,
        robot: &str,
        device: &str,
    ) -> Result<Vec<CommandDescriptor>, MasterError>;

    /// Runs a device command with positional arguments.
    fn execute_device_command(
        &self,
        robot: &str,
        device: &str,
        command: &str,
        args: &[Value],
    ) -> Result<Value, MasterError>;

    /// Lists a robot's connections.
    fn list_robot_connections(&self, robot: &str)
    -> Result<Vec<ConnectionDescriptor>, MasterError>;

    /// Looks up one connection of a robot.
    fn get_robot_connection(
        &self,
        robot: &str,
        connection: &str,
    ) -> Result<ConnectionDescriptor, MasterError>;
}
