//! The project interface the scripting core consumes.
//!
//! A project owns devices and the signal connections between its objects.
//! The core never holds a strong reference to a project: devices point to
//! their owner through a [`Weak`](std::sync::Weak) handle and re-check it on
//! every access.

use crate::{Device, DeviceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A directed signal connection between two station objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoConnection {
    pub source_object: String,
    pub source_signal: String,
    pub target_object: String,
    pub target_signal: String,
    #[serde(default = "default_allow_cycle")]
    pub allow_cycle: bool,
}

fn default_allow_cycle() -> bool {
    true
}

impl IoConnection {
    /// Returns `true` if both connections link the same endpoints.
    ///
    /// The cycle flag is not part of a connection's identity.
    #[must_use]
    pub fn same_endpoints(&self, other: &IoConnection) -> bool {
        self.source_object == other.source_object
            && self.source_signal == other.source_signal
            && self.target_object == other.target_object
            && self.target_signal == other.target_signal
    }

    /// Returns `true` if `object` is either endpoint.
    #[must_use]
    pub fn touches(&self, object: &str) -> bool {
        self.source_object == object || self.target_object == object
    }
}

/// What the core needs to know about an object found by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    /// Whether the object can be an endpoint of an [`IoConnection`].
    pub supports_connections: bool,
}

/// Owning project of a set of devices.
///
/// Implementations must be usable from any thread; the core only calls them
/// from the host's control thread.
pub trait Project: Send + Sync {
    /// Project name. Devices of an unnamed project are not tracked.
    fn name(&self) -> String;

    /// Resolves an id back to the device object it names.
    fn device(&self, id: &DeviceId) -> Option<Arc<Device>>;

    /// Finds the first object with the given display name.
    fn find_object(&self, name: &str) -> Option<ObjectInfo>;

    /// Snapshot of all connections.
    fn connections(&self) -> Vec<IoConnection>;

    /// Adds a connection. Duplicate detection is the caller's job.
    fn add_connection(&self, connection: IoConnection);

    /// Forces every connection targeting `object` to propagate its current value.
    fn update_connections_to(&self, object: &str);
}
