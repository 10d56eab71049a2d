//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::OrthoError;
use tempfile::TempDir;

use robolink_config::{Config, SocketEndpoint, WireProtocol};

use crate::bootstrap::ConfigLoader;

/// Inventory served by scenarios that talk to a live daemon.
pub const SAMPLE_INVENTORY: &str = r#"{
  "robots": [
    {
      "id": "r1",
      "name": "Rover",
      "kind": "rover",
      "commands": [{ "id": "stop", "arity": 0 }, { "id": "drive", "arity": 2 }],
      "devices": [
        { "id": "arm", "name": "Gripper", "kind": "manipulator", "commands": [{ "id": "grip", "arity": 1 }] }
      ],
      "connections": [{ "id": "c1", "kind": "serial", "address": "/dev/ttyUSB0" }]
    }
  ]
}"#;

/// Loader that provisions sockets and inventory files under a temporary
/// directory.
pub struct TestConfigLoader {
    dir: TempDir,
    endpoint: Option<SocketEndpoint>,
    protocol: WireProtocol,
    inventory: Option<Utf8PathBuf>,
}

impl TestConfigLoader {
    /// Loader for a Unix socket inside a fresh temporary directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temporary directory for socket"),
            endpoint: None,
            protocol: WireProtocol::Raw,
            inventory: None,
        }
    }

    /// Listens on an ephemeral loopback TCP port instead.
    #[must_use]
    pub fn tcp(mut self) -> Self {
        self.endpoint = Some(SocketEndpoint::tcp("127.0.0.1", 0));
        self
    }

    /// Selects the framing layer spoken on accepted connections.
    #[must_use]
    pub fn with_protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Writes [`SAMPLE_INVENTORY`] to disk and points the config at it.
    #[must_use]
    pub fn with_sample_inventory(mut self) -> Self {
        let path = self.path("inventory.json");
        fs::write(&path, SAMPLE_INVENTORY).expect("write inventory file");
        self.inventory = Some(path);
        self
    }

    /// Points the config at an inventory file that does not exist.
    #[must_use]
    pub fn with_missing_inventory(mut self) -> Self {
        self.inventory = Some(self.path("absent.json"));
        self
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().join(name))
            .expect("temporary path was not valid UTF-8")
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let daemon_socket = self
            .endpoint
            .clone()
            .unwrap_or_else(|| SocketEndpoint::unix(self.path("robolinkd.sock")));
        Ok(Config {
            daemon_socket,
            protocol: self.protocol,
            poll_interval_ms: 1,
            inventory_path: self.inventory.clone(),
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("robolinkd"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
