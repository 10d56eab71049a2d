//! Static table mapping request identifiers to handlers.
//!
//! The registry is built once at startup and shared read-only by every
//! session. Lookups use the canonical (trimmed) identifier.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::errors::CommandError;
use super::handlers;
use super::request::RequestParams;
use crate::master::Master;

/// A request handler.
///
/// Handlers read their own fields from the request and call the master.
pub type Handler = fn(&dyn Master, &RequestParams) -> Result<Value, CommandError>;

/// Immutable identifier-to-handler table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// The ten robot, device and connection operations.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .register("robots", handlers::robots)
            .register("robot", handlers::robot)
            .register("robot_commands", handlers::robot_commands)
            .register("robot_command", handlers::robot_command)
            .register("robot_devices", handlers::robot_devices)
            .register("robot_device", handlers::robot_device)
            .register("robot_device_commands", handlers::robot_device_commands)
            .register("robot_device_command", handlers::robot_device_command)
            .register("robot_connections", handlers::robot_connections)
            .register("robot_connection", handlers::robot_connection)
            .build()
    }

    /// Looks up the handler for a canonical identifier.
    #[must_use]
    pub fn get(&self, request_id: &str) -> Option<Handler> {
        self.handlers.get(request_id).copied()
    }

    /// Registered identifiers in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Accumulates registrations before freezing them into a [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistryBuilder {
    /// Adds a handler, replacing any earlier registration under the same
    /// name. Names are trimmed.
    #[must_use]
    pub fn register(mut self, name: impl AsRef<str>, handler: Handler) -> Self {
        self.handlers
            .insert(name.as_ref().trim().to_owned(), handler);
        self
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
