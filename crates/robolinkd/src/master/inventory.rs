//! Inventory-backed master used by the daemon binary.
//!
//! The inventory is a JSON document listing robots together with their
//! commands, devices and connections. Commands are validated against their
//! declared arity and acknowledged; nothing is actuated.

use std::collections::HashSet;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::{
    CommandDescriptor, ConnectionDescriptor, DeviceDescriptor, Master, MasterError,
    RobotDescriptor,
};

const MASTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::master");

/// Errors raised while loading an inventory file.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The file could not be read.
    #[error("failed to read inventory '{path}': {source}")]
    Read {
        /// Inventory path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid inventory document.
    #[error("failed to parse inventory: {source}")]
    Parse {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Two robots share an identifier.
    #[error("duplicate robot id '{id}' in inventory")]
    DuplicateRobot {
        /// Repeated identifier.
        id: String,
    },
}

/// Parsed inventory document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    robots: Vec<RobotEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RobotEntry {
    id: String,
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    commands: Vec<CommandDescriptor>,
    #[serde(default)]
    devices: Vec<DeviceEntry>,
    #[serde(default)]
    connections: Vec<ConnectionDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
struct DeviceEntry {
    id: String,
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    commands: Vec<CommandDescriptor>,
}

impl Inventory {
    /// Parses an inventory from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Parse`] for malformed documents and
    /// [`InventoryError::DuplicateRobot`] when robot identifiers repeat.
    pub fn from_json(text: &str) -> Result<Self, InventoryError> {
        let inventory: Self =
            serde_json::from_str(text).map_err(|source| InventoryError::Parse { source })?;
        inventory.check_unique_robots()?;
        Ok(inventory)
    }

    /// Reads and parses an inventory file.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Read`] when the file cannot be read, or any
    /// error from [`Inventory::from_json`].
    pub fn load(path: &Utf8Path) -> Result<Self, InventoryError> {
        let text = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Number of robots in the inventory.
    #[must_use]
    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    fn check_unique_robots(&self) -> Result<(), InventoryError> {
        let mut seen = HashSet::new();
        for robot in &self.robots {
            if !seen.insert(robot.id.as_str()) {
                return Err(InventoryError::DuplicateRobot {
                    id: robot.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// [`Master`] serving a static [`Inventory`].
#[derive(Debug, Default)]
pub struct InventoryMaster {
    inventory: Inventory,
    executions: AtomicU64,
}

impl InventoryMaster {
    /// Wraps an inventory.
    #[must_use]
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            executions: AtomicU64::new(0),
        }
    }

    fn robot(&self, robot: &str) -> Result<&RobotEntry, MasterError> {
        self.inventory
            .robots
            .iter()
            .find(|entry| entry.id == robot)
            .ok_or_else(|| MasterError::robot_not_found(robot))
    }

    fn device(&self, robot: &str, device: &str) -> Result<&DeviceEntry, MasterError> {
        self.robot(robot)?
            .devices
            .iter()
            .find(|entry| entry.id == device)
            .ok_or_else(|| MasterError::device_not_found(robot, device))
    }

    fn acknowledge(
        &self,
        commands: &[CommandDescriptor],
        target: &str,
        command: &str,
        args: &[Value],
    ) -> Result<Map<String, Value>, MasterError> {
        let descriptor = commands
            .iter()
            .find(|entry| entry.id == command)
            .ok_or_else(|| MasterError::command_not_found(target, command))?;
        if descriptor.arity != args.len() {
            return Err(MasterError::InvalidArgumentCount {
                command: command.to_owned(),
                expected: descriptor.arity,
                actual: args.len(),
            });
        }

        let sequence = self.executions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            target: MASTER_TARGET,
            target_path = target,
            command,
            sequence,
            "command acknowledged"
        );

        let mut ack = Map::new();
        ack.insert(String::from("commandid"), Value::from(command));
        ack.insert(String::from("arguments"), Value::Array(args.to_vec()));
        ack.insert(String::from("sequence"), Value::from(sequence));
        Ok(ack)
    }
}

impl RobotEntry {
    fn descriptor(&self) -> RobotDescriptor {
        RobotDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl DeviceEntry {
    fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl Master for InventoryMaster {
    fn list_robots(&self) -> Result<Vec<RobotDescriptor>, MasterError> {
        Ok(self
            .inventory
            .robots
            .iter()
            .map(RobotEntry::descriptor)
            .collect())
    }

    fn get_robot(&self, robot: &str) -> Result<RobotDescriptor, MasterError> {
        self.robot(robot).map(RobotEntry::descriptor)
    }

    fn get_robot_commands(&self, robot: &str) -> Result<Vec<CommandDescriptor>, MasterError> {
        Ok(self.robot(robot)?.commands.clone())
    }

    fn execute_robot_command(
        &self,
        robot: &str,
        command: &str,
        args: &[Value],
    ) -> Result<Value, MasterError> {
        let entry = self.robot(robot)?;
        let mut ack = self.acknowledge(&entry.commands, robot, command, args)?;
        ack.insert(String::from("robotid"), Value::from(robot));
        Ok(Value::Object(ack))
    }

    fn list_robot_devices(&self, robot: &str) -> Result<Vec<DeviceDescriptor>, MasterError> {
        Ok(self
            .robot(robot)?
            .devices
            .iter()
            .map(DeviceEntry::descriptor)
            .collect())
    }

    fn get_robot_device(
        &self,
        robot: &str,
        device: &str,
    ) -> Result<DeviceDescriptor, MasterError> {
        self.device(robot, device).map(DeviceEntry::descriptor)
    }

    fn get_device_commands(
        &self,
        robot: &str,
        device: &str,
    ) -> Result<Vec<CommandDescriptor>, MasterError> {
        Ok(self.device(robot, device)?.commands.clone())
    }

    fn execute_device_command(
        &self,
        robot: &str,
        device: &str,
        command: &str,
        args: &[Value],
    ) -> Result<Value, MasterError> {
        let entry = self.device(robot, device)?;
        let target = format!("{robot}/{device}");
        let mut ack = self.acknowledge(&entry.commands, &target, command, args)?;
        ack.insert(String::from("robotid"), Value::from(robot));
        ack.insert(String::from("deviceid"), Value::from(device));
        Ok(Value::Object(ack))
    }

    fn list_robot_connections(
        &self,
        robot: &str,
    ) -> Result<Vec<ConnectionDescriptor>, MasterError> {
        Ok(self.robot(robot)?.connections.clone())
    }

    fn get_robot_connection(
        &self,
        robot: &str,
        connection: &str,
    ) -> Result<ConnectionDescriptor, MasterError> {
        self.robot(robot)?
            .connections
            .iter()
            .find(|entry| entry.id == connection)
            .cloned()
            .ok_or_else(|| MasterError::connection_not_found(robot, connection))
    }
}
